use crate::foundation::core::AssetId;

/// Convenience result type used across Darkroom.
pub type DarkroomResult<T> = Result<T, DarkroomError>;

/// Top-level error taxonomy used by engine, store and job APIs.
#[derive(thiserror::Error, Debug)]
pub enum DarkroomError {
    /// An individual asset's bytes could not be decoded as an image.
    #[error("decode error: asset '{asset}': {reason}")]
    Decode {
        /// Display name or id of the asset that failed.
        asset: String,
        /// Underlying decoder message.
        reason: String,
    },

    /// A lookup-table file was malformed.
    #[error("lut parse error{}: {reason}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    LutParse {
        /// 1-based source line, when the failure is tied to one.
        line: Option<usize>,
        /// Human-readable description.
        reason: String,
    },

    /// An operation was invoked on a disposed grading engine.
    #[error("engine disposed: the grading engine has been disposed")]
    EngineDisposed,

    /// A batch job hit an unrecoverable failure (overlay decode, archive finalize).
    #[error("job failed: {0}")]
    JobFatal(String),

    /// An operation referenced an asset that is no longer in the store.
    #[error("config not found: asset {0}")]
    ConfigNotFound(AssetId),

    /// Invalid user-provided settings or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rendered pixels could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Archive container write failure.
    #[error("archive error: {0}")]
    Archive(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DarkroomError {
    /// Build a [`DarkroomError::Decode`] value.
    pub fn decode(asset: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            asset: asset.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`DarkroomError::LutParse`] value tied to a source line.
    pub fn lut_parse(line: usize, reason: impl Into<String>) -> Self {
        Self::LutParse {
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// Build a [`DarkroomError::LutParse`] value for whole-file problems.
    pub fn lut_parse_file(reason: impl Into<String>) -> Self {
        Self::LutParse {
            line: None,
            reason: reason.into(),
        }
    }

    /// Build a [`DarkroomError::JobFatal`] value.
    pub fn job_fatal(msg: impl Into<String>) -> Self {
        Self::JobFatal(msg.into())
    }

    /// Build a [`DarkroomError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DarkroomError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`DarkroomError::Archive`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Whether a batch loop may record this error and continue with the next asset.
    pub fn is_per_asset(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Encode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
