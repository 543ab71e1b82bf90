use kurbo::{ParamCurve, ParamCurveArclen, PathSeg, Shape};

use crate::foundation::{
    core::{BezPath, Point, Rect},
    error::{StorypathError, StorypathResult},
};

/// Accuracy passed to kurbo's arc-length routines, in pixels.
pub const ARCLEN_ACCURACY: f64 = 1e-3;

#[derive(Clone, Debug)]
/// A path curve as delivered by a [`GeometryProvider`].
pub struct NamedCurve {
    /// Identifier from the drawing (e.g. the SVG `id` attribute).
    pub id: String,
    /// Curve geometry in viewport pixels.
    pub path: BezPath,
}

impl NamedCurve {
    /// Pair `id` with `path`.
    pub fn new(id: impl Into<String>, path: BezPath) -> Self {
        Self {
            id: id.into(),
            path,
        }
    }
}

/// Source of named path curves, typically a parsed vector drawing.
///
/// Curves are read in viewport pixel units, so a provider is queried again after every resize.
pub trait GeometryProvider {
    /// All curves carrying an identifier, in document order. Duplicates are reported as-is.
    fn curves(&self) -> StorypathResult<Vec<NamedCurve>>;
}

/// Provider whose curves follow the viewport width.
pub trait ViewportGeometry: GeometryProvider {
    /// Re-scale to a viewport `px` wide.
    fn set_viewport_width(&mut self, px: f64) -> StorypathResult<()>;
}

#[derive(Clone, Copy, Debug)]
struct SegmentSpan {
    seg: PathSeg,
    start: f64,
    len: f64,
}

#[derive(Clone, Debug)]
/// Path curve with arc lengths pre-computed per segment.
///
/// Construction does all the expensive work once; [`PathCurve::point_at_distance`] is a binary
/// search plus one inverse arc-length solve on a single segment.
pub struct PathCurve {
    path: BezPath,
    segments: Vec<SegmentSpan>,
    length: f64,
    bounds: Rect,
}

impl PathCurve {
    /// Measure `path`. Fails if it has no drawable segment.
    pub fn new(path: BezPath) -> StorypathResult<Self> {
        let mut segments = Vec::new();
        let mut length = 0.0;
        for seg in path.segments() {
            let len = seg.arclen(ARCLEN_ACCURACY);
            segments.push(SegmentSpan {
                seg,
                start: length,
                len,
            });
            length += len;
        }
        if segments.is_empty() {
            return Err(StorypathError::geometry("path curve has no drawable segments"));
        }
        if !length.is_finite() {
            return Err(StorypathError::geometry("path curve length is not finite"));
        }

        let bounds = path.bounding_box();
        Ok(Self {
            path,
            segments,
            length,
            bounds,
        })
    }

    /// Underlying path.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Total arc length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Bounding box of the curve geometry.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Height of the bounding box (always `>= 0`).
    pub fn height_of_bounding_box(&self) -> f64 {
        self.bounds.height()
    }

    /// Bounding-box height, negated when the curve ends above where it starts.
    pub fn signed_height(&self) -> f64 {
        if self.end().y < self.start().y {
            -self.height_of_bounding_box()
        } else {
            self.height_of_bounding_box()
        }
    }

    /// Point at distance zero.
    pub fn start(&self) -> Point {
        self.segments[0].seg.start()
    }

    /// Point at the full length.
    pub fn end(&self) -> Point {
        self.segments[self.segments.len() - 1].seg.end()
    }

    /// Point at arc length `d`, clamped to `[0, length]`.
    pub fn point_at_distance(&self, d: f64) -> Point {
        let d = if d.is_nan() { 0.0 } else { d.clamp(0.0, self.length) };
        let i = self
            .segments
            .partition_point(|s| s.start + s.len < d)
            .min(self.segments.len() - 1);
        let span = &self.segments[i];
        if span.len <= 0.0 {
            return span.seg.start();
        }
        let local = (d - span.start).clamp(0.0, span.len);
        let t = span.seg.inv_arclen(local, ARCLEN_ACCURACY);
        span.seg.eval(t)
    }

    /// Point at `fraction` of the total length.
    pub fn point_at_fraction(&self, fraction: f64) -> Point {
        self.point_at_distance(fraction * self.length)
    }
}

#[derive(Clone, Debug, Default)]
/// In-memory geometry provider built from SVG path data strings.
pub struct StaticGeometry {
    curves: Vec<NamedCurve>,
}

impl StaticGeometry {
    /// Empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a curve from SVG path data (`d` attribute syntax).
    pub fn with_path_data(mut self, id: impl Into<String>, d: &str) -> StorypathResult<Self> {
        let id = id.into();
        let path = BezPath::from_svg(d.trim()).map_err(|e| {
            StorypathError::geometry(format!("invalid path data for '{id}': {e}"))
        })?;
        self.curves.push(NamedCurve::new(id, path));
        Ok(self)
    }

    /// Add an already-built curve.
    pub fn with_curve(mut self, curve: NamedCurve) -> Self {
        self.curves.push(curve);
        self
    }

    /// Replace every curve's geometry with `f(id, path)`, e.g. to simulate a resize.
    pub fn map_paths(&mut self, mut f: impl FnMut(&str, &mut BezPath)) {
        for c in &mut self.curves {
            f(&c.id, &mut c.path);
        }
    }
}

impl GeometryProvider for StaticGeometry {
    fn curves(&self) -> StorypathResult<Vec<NamedCurve>> {
        Ok(self.curves.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/curve.rs"]
mod tests;
