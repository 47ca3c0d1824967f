use std::sync::Arc;

use crate::{
    assets::decode::OverlayAsset,
    foundation::error::DarkroomResult,
};

/// The session's single overlay.
///
/// Renders and jobs hold an `Arc` snapshot, so replacing or clearing the slot is only seen by
/// renders that start afterwards.
#[derive(Debug, Default)]
pub struct OverlaySlot {
    current: Option<Arc<OverlayAsset>>,
}

impl OverlaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and install a new overlay. On a decode error the previous overlay stays.
    pub fn set(&mut self, name: &str, bytes: &[u8]) -> DarkroomResult<Arc<OverlayAsset>> {
        let overlay = Arc::new(OverlayAsset::decode(name, bytes)?);
        tracing::info!(overlay = name, w = overlay.width(), h = overlay.height(), "overlay replaced");
        self.current = Some(overlay.clone());
        Ok(overlay)
    }

    pub fn clear(&mut self) -> Option<Arc<OverlayAsset>> {
        self.current.take()
    }

    pub fn get(&self) -> Option<Arc<OverlayAsset>> {
        self.current.clone()
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }
}

/// Identifies one preview request; later requests compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

/// Keeps only the output of the newest preview request.
///
/// Results may arrive in any order; a result is shown only if no newer request has been issued
/// since its ticket.
#[derive(Debug)]
pub struct LatestRender<T> {
    issued: u64,
    shown: Option<(RenderTicket, T)>,
}

impl<T> Default for LatestRender<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            shown: None,
        }
    }
}

impl<T> LatestRender<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RenderTicket {
        self.issued += 1;
        RenderTicket(self.issued)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Show `value` if `ticket` is still the newest request. Stale results are dropped.
    pub fn offer(&mut self, ticket: RenderTicket, value: T) -> bool {
        if !self.is_current(ticket) {
            tracing::trace!(ticket = ticket.0, newest = self.issued, "dropping stale preview");
            return false;
        }
        self.shown = Some((ticket, value));
        true
    }

    pub fn shown(&self) -> Option<&T> {
        self.shown.as_ref().map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.shown = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tools/preview.rs"]
mod tests;
