/// Error type shared by the renderer crates
use thiserror::Error;

/// Errors surfaced while setting up or presenting a frame.
///
/// The per-frame pipeline itself has no failure path: degenerate geometry is
/// either culled or shaded with whatever colour the arithmetic produces.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A construction option is outside its valid range.
    #[error("invalid option `{name}`: {value}")]
    InvalidOption { name: &'static str, value: f64 },

    /// The draw surface failed to resize or present.
    #[error("draw surface error: {0}")]
    Surface(#[from] std::io::Error),

    /// Scene configuration could not be decoded.
    #[error("invalid scene configuration: {0}")]
    Config(String),
}

/// Reject non-finite or non-positive option values.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, RenderError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(RenderError::InvalidOption { name, value })
    }
}
