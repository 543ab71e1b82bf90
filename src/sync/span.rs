use crate::{compose::materializer::PathMeta, sync::state::AvatarPhase};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Vertical band of document space an avatar's path occupies.
pub struct PathSpan {
    /// Smaller y of the band.
    pub top: f64,
    /// Larger y of the band.
    pub bottom: f64,
    /// The path runs upward; progress decreases as the scroll offset grows.
    pub inverted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Result of placing a scroll position against a [`PathSpan`].
pub struct Placement {
    /// Which side of the span, or inside it.
    pub phase: AvatarPhase,
    /// Progress clamped to `[0, 1]`; outside the span this is the nearest edge.
    pub progress: f64,
    /// Directional progress without clamping.
    pub raw_progress: f64,
    /// Share of the span scrolled past, without clamping or inversion. Drives point triggers.
    pub scroll_fraction: f64,
}

impl PathSpan {
    /// Span of a path starting at `start_y` with bounding height `signed_height`.
    pub fn new(start_y: f64, signed_height: f64) -> Self {
        let end_y = start_y + signed_height;
        Self {
            top: start_y.min(end_y),
            bottom: start_y.max(end_y),
            inverted: end_y < start_y,
        }
    }

    /// Span of a measured path.
    pub fn from_meta(meta: &PathMeta) -> Self {
        Self::new(meta.start.y, meta.height)
    }

    /// `bottom - top`.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Locate `y` (already biased by scene and avatar offsets).
    pub fn place(&self, y: f64) -> Placement {
        let phase = if y < self.top {
            AvatarPhase::BeforeStart
        } else if y > self.bottom {
            AvatarPhase::AfterEnd
        } else {
            AvatarPhase::Active
        };
        let scroll_fraction = self.scroll_fraction(y);
        let raw_progress = self.directional(scroll_fraction);
        let progress = match phase {
            AvatarPhase::Active => raw_progress.clamp(0.0, 1.0),
            // Snap to the edge the avatar left through.
            AvatarPhase::BeforeStart => self.directional(0.0),
            AvatarPhase::AfterEnd => self.directional(1.0),
        };
        Placement {
            phase,
            progress,
            raw_progress,
            scroll_fraction,
        }
    }

    /// Progress at `y` without clamping, inverted for upward paths.
    pub fn raw_progress(&self, y: f64) -> f64 {
        self.directional(self.scroll_fraction(y))
    }

    /// `(y - top) / height` without clamping. Grows with the scroll offset in both directions.
    ///
    /// A zero-height span reports `0` on its line and infinities on either side.
    pub fn scroll_fraction(&self, y: f64) -> f64 {
        let h = self.height();
        if h > 0.0 {
            (y - self.top) / h
        } else if y < self.top {
            f64::NEG_INFINITY
        } else if y > self.bottom {
            f64::INFINITY
        } else {
            0.0
        }
    }

    fn directional(&self, t: f64) -> f64 {
        if self.inverted { 1.0 - t } else { t }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/span.rs"]
mod tests;
