use std::{path::Path, sync::Arc};

use anyhow::Context;
use usvg::tiny_skia_path::PathSegment;

use crate::{
    foundation::{
        core::BezPath,
        error::{StorypathError, StorypathResult},
    },
    geometry::curve::{GeometryProvider, NamedCurve, ViewportGeometry},
};

/// Geometry provider backed by a parsed SVG drawing.
///
/// Every `<path>` (and basic shape, which usvg converts to a path) with a non-empty `id` becomes
/// a [`NamedCurve`]. Coordinates are mapped through the node's absolute transform and then
/// scaled from the drawing's width to the current render width.
#[derive(Clone, Debug)]
pub struct SvgGeometry {
    tree: Arc<usvg::Tree>,
    render_width: f64,
}

impl SvgGeometry {
    /// Parse SVG bytes. The drawing initially renders at its own width.
    pub fn from_data(bytes: &[u8]) -> StorypathResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts)
            .map_err(|e| StorypathError::geometry(format!("parse svg drawing: {e}")))?;
        let render_width = f64::from(tree.size().width());
        Ok(Self {
            tree: Arc::new(tree),
            render_width,
        })
    }

    /// Read and parse an SVG file.
    pub fn from_path(path: impl AsRef<Path>) -> StorypathResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read svg from '{}'", path.display()))?;
        Self::from_data(&bytes)
    }

    /// Width of the drawing in its own user units.
    pub fn view_width(&self) -> f64 {
        f64::from(self.tree.size().width())
    }

    /// Width the drawing is currently rendered at, in viewport pixels.
    pub fn render_width(&self) -> f64 {
        self.render_width
    }

    /// Update the render width after a viewport resize.
    pub fn set_render_width(&mut self, px: f64) -> StorypathResult<()> {
        if !px.is_finite() || px <= 0.0 {
            return Err(StorypathError::validation(
                "svg render width must be finite and > 0",
            ));
        }
        self.render_width = px;
        Ok(())
    }

    fn scale(&self) -> f64 {
        let w = self.view_width();
        if w > 0.0 { self.render_width / w } else { 1.0 }
    }
}

impl GeometryProvider for SvgGeometry {
    fn curves(&self) -> StorypathResult<Vec<NamedCurve>> {
        let mut out = Vec::new();
        collect_paths(self.tree.root(), kurbo::Affine::scale(self.scale()), &mut out);
        Ok(out)
    }
}

impl ViewportGeometry for SvgGeometry {
    fn set_viewport_width(&mut self, px: f64) -> StorypathResult<()> {
        self.set_render_width(px)
    }
}

fn collect_paths(group: &usvg::Group, viewport: kurbo::Affine, out: &mut Vec<NamedCurve>) {
    for child in group.children() {
        match child {
            usvg::Node::Group(g) => collect_paths(g.as_ref(), viewport, out),
            usvg::Node::Path(p) => {
                if p.id().is_empty() {
                    continue;
                }
                let mut path = to_bez_path(p.data());
                path.apply_affine(viewport * to_affine(p.abs_transform()));
                out.push(NamedCurve::new(p.id(), path));
            }
            usvg::Node::Image(_) | usvg::Node::Text(_) => {}
        }
    }
}

fn to_affine(ts: usvg::Transform) -> kurbo::Affine {
    kurbo::Affine::new([
        f64::from(ts.sx),
        f64::from(ts.ky),
        f64::from(ts.kx),
        f64::from(ts.sy),
        f64::from(ts.tx),
        f64::from(ts.ty),
    ])
}

fn to_bez_path(data: &usvg::tiny_skia_path::Path) -> BezPath {
    let pt = |p: usvg::tiny_skia_path::Point| kurbo::Point::new(f64::from(p.x), f64::from(p.y));
    let mut path = BezPath::new();
    for seg in data.segments() {
        match seg {
            PathSegment::MoveTo(p) => path.move_to(pt(p)),
            PathSegment::LineTo(p) => path.line_to(pt(p)),
            PathSegment::QuadTo(p1, p) => path.quad_to(pt(p1), pt(p)),
            PathSegment::CubicTo(p1, p2, p) => path.curve_to(pt(p1), pt(p2), pt(p)),
            PathSegment::Close => path.close_path(),
        }
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/svg.rs"]
mod tests;
