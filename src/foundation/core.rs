use crate::foundation::error::{StorypathError, StorypathResult};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// On-screen size in CSS pixels. Either side may be left to the image's intrinsic size.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Size {
    /// Square size `px` x `px`.
    pub fn square(px: f64) -> Self {
        Self::new(px, px)
    }

    /// Explicit width and height.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    pub(crate) fn validate(&self, field: &str) -> StorypathResult<()> {
        for (side, v) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = v
                && (!v.is_finite() || v < 0.0)
            {
                return Err(StorypathError::validation(format!(
                    "{field}.{side} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_finite(v: f64, field: &str) -> StorypathResult<()> {
    if !v.is_finite() {
        return Err(StorypathError::validation(format!(
            "{field} must be finite"
        )));
    }
    Ok(())
}
