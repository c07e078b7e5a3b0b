//! Error Types
//!
//! This module defines the error types used throughout the stage.
//!
//! # Overview
//!
//! The main error type [`StageError`] covers every failure mode the stage
//! surfaces to the UI layer:
//! - Viewport initialization failures (container missing, no graphics context)
//! - Asset loading and decoding errors (fatal for the model, non-fatal per clip)
//! - Animation operations invoked before the model and mixer exist
//! - Configuration errors
//!
//! None of these trigger internal retries. Every failure is recoverable by
//! re-invoking the operation that produced it.
//!
//! ```rust,ignore
//! use avatar_stage::errors::{StageError, Result};
//!
//! fn play() -> Result<()> {
//!     Err(StageError::NotReady("animation system not initialized"))
//! }
//! ```

use thiserror::Error;

use crate::animation::AnimationKind;

/// The main error type for the avatar stage.
#[derive(Error, Debug)]
pub enum StageError {
    // ========================================================================
    // Viewport Errors
    // ========================================================================
    /// The render surface could not be created (missing container, zero-area
    /// container, or graphics context unavailable).
    #[error("Viewport initialization failed: {0}")]
    Initialization(String),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The avatar model (or one of its buffers) failed to load or parse.
    #[error("Failed to load asset '{uri}': {reason}")]
    AssetLoad {
        /// Asset location as given to the reader
        uri: String,
        /// Readable failure description
        reason: String,
    },

    /// A single motion clip failed to load. Recorded, never fatal on its own.
    #[error("Failed to load animation {kind}: {reason}")]
    ClipLoad {
        /// Which animation the clip belongs to
        kind: AnimationKind,
        /// Readable failure description
        reason: String,
    },

    /// glTF parsing error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// Base64 data URI decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// An animation operation ran before the model and mixing context exist.
    #[error("Animation system not ready: {0}")]
    NotReady(&'static str),

    /// The model is loaded but this animation's clip is absent.
    #[error("Animation clip missing: {0}")]
    ClipMissing(AnimationKind),

    /// A name that is not one of the fixed animation kinds.
    #[error("Unknown animation: {0}")]
    UnknownAnimation(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration violates an invariant.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<gltf::Error> for StageError {
    fn from(err: gltf::Error) -> Self {
        StageError::Gltf(err.to_string())
    }
}

impl StageError {
    /// Wraps any error as an [`StageError::AssetLoad`] for the given asset.
    pub(crate) fn asset_load(uri: &str, err: impl std::fmt::Display) -> Self {
        StageError::AssetLoad {
            uri: uri.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Alias for `Result<T, StageError>`.
pub type Result<T> = std::result::Result<T, StageError>;
