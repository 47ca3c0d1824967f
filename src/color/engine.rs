use std::sync::Arc;

use image::RgbaImage;

use crate::{
    assets::decode::decode_named,
    color::{
        lut::Lut3d,
        ops::grade_image,
        params::{ColorConfig, ColorParams},
    },
    export::encode::{OutputFormat, encode_image},
    foundation::{
        core::Rgb8,
        error::{DarkroomError, DarkroomResult},
    },
};

/// Stateful grading processor: one source image, an optional LUT, and a render surface.
///
/// Preview sessions and batch workers each own their own engine; nothing here is shared across
/// threads. After [`GradingEngine::dispose`] every operation returns
/// [`DarkroomError::EngineDisposed`].
#[derive(Debug)]
pub struct GradingEngine {
    state: Option<EngineState>,
}

#[derive(Debug, Default)]
struct EngineState {
    source: Option<RgbaImage>,
    lut: Option<Arc<Lut3d>>,
    surface: RgbaImage,
    rendered: bool,
}

impl GradingEngine {
    pub fn new() -> Self {
        Self {
            state: Some(EngineState::default()),
        }
    }

    fn live(&mut self) -> DarkroomResult<&mut EngineState> {
        self.state.as_mut().ok_or(DarkroomError::EngineDisposed)
    }

    fn live_ref(&self) -> DarkroomResult<&EngineState> {
        self.state.as_ref().ok_or(DarkroomError::EngineDisposed)
    }

    /// Decode `bytes` and make them the working image.
    ///
    /// Decoding finishes before anything is swapped: a failed decode leaves the previous image and
    /// surface untouched, and a successful one invalidates the surface.
    pub fn load_image(&mut self, name: &str, bytes: &[u8]) -> DarkroomResult<()> {
        self.live()?;
        let decoded = decode_named(name, bytes)?;
        self.load_decoded(decoded)
    }

    /// Install an already-decoded straight-alpha image as the working image.
    pub fn load_decoded(&mut self, image: RgbaImage) -> DarkroomResult<()> {
        let state = self.live()?;
        state.source = Some(image);
        state.rendered = false;
        Ok(())
    }

    pub fn has_image(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.source.is_some())
    }

    pub fn load_lut(&mut self, lut: Arc<Lut3d>) -> DarkroomResult<()> {
        let state = self.live()?;
        state.lut = Some(lut);
        state.rendered = false;
        Ok(())
    }

    /// Parse and install a `.cube` LUT. A parse failure keeps the previously installed LUT.
    pub fn load_lut_cube(&mut self, text: &str) -> DarkroomResult<Arc<Lut3d>> {
        self.live()?;
        let lut = Arc::new(Lut3d::parse_cube(text)?);
        self.load_lut(lut.clone())?;
        Ok(lut)
    }

    pub fn clear_lut(&mut self) -> DarkroomResult<()> {
        let state = self.live()?;
        state.lut = None;
        state.rendered = false;
        Ok(())
    }

    pub fn lut(&self) -> DarkroomResult<Option<&Arc<Lut3d>>> {
        Ok(self.live_ref()?.lut.as_ref())
    }

    /// Grade the working image with `params` and the installed LUT into the surface.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn render(&mut self, params: &ColorParams) -> DarkroomResult<&RgbaImage> {
        let state = self.live()?;
        let Some(source) = state.source.as_ref() else {
            return Err(DarkroomError::validation("no image loaded"));
        };
        grade_image(source, params, state.lut.as_deref(), &mut state.surface);
        state.rendered = true;
        tracing::debug!(
            width = state.surface.width(),
            height = state.surface.height(),
            lut = state.lut.is_some(),
            "graded"
        );
        Ok(&state.surface)
    }

    /// Sync the LUT to `config` then render its params.
    pub fn apply_config(&mut self, config: &ColorConfig) -> DarkroomResult<&RgbaImage> {
        match &config.lut {
            Some(lut) => self.load_lut(lut.clone())?,
            None => self.clear_lut()?,
        }
        self.render(&config.params)
    }

    /// The last rendered surface.
    pub fn surface(&self) -> DarkroomResult<&RgbaImage> {
        let state = self.live_ref()?;
        if !state.rendered {
            return Err(DarkroomError::validation("nothing rendered since the last change"));
        }
        Ok(&state.surface)
    }

    pub fn to_encoded_bytes(&self, format: OutputFormat, background: Rgb8) -> DarkroomResult<Vec<u8>> {
        encode_image(self.surface()?, format, background)
    }

    /// Release the image, LUT and surface. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.state.take().is_some() {
            tracing::debug!("grading engine disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_none()
    }
}

impl Default for GradingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/engine.rs"]
mod tests;
