//! Error types shared across the orrery.
//!
//! Everything except [`OrreryError::DeviceLost`] is fatal: it propagates to the
//! top of the frame loop and ends the run with a diagnostic.

use crate::celestial::CelestialBodyId;

/// Errors raised by the catalog, the bodies, the scene and the renderer.
#[derive(Debug, thiserror::Error)]
pub enum OrreryError {
    /// No catalog entry exists for the body.
    #[error("no catalog entry for {0:?}")]
    CatalogLookup(CelestialBodyId),

    /// A body that does not own a light was asked for one.
    #[error("{0:?} has no light")]
    MissingLight(CelestialBodyId),

    /// A body without a parent was asked for one.
    #[error("{0:?} has no parent object")]
    MissingParent(CelestialBodyId),

    /// A texture, mesh or GPU resource could not be loaded or allocated.
    #[error("failed to create {what}: {reason}")]
    ResourceCreation { what: String, reason: String },

    /// The surface or device was lost; device resources must be rebuilt.
    #[error("rendering device lost")]
    DeviceLost,

    /// Presenting a frame failed for a reason other than device loss.
    #[error("failed to present frame: {0}")]
    Presentation(String),

    /// Startup configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl OrreryError {
    pub fn resource(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceCreation {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the frame loop can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DeviceLost)
    }
}

/// Errors that can occur when loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A value is out of its valid range.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
