use std::collections::HashMap;

use crate::{
    assets::{
        prefetch::{ImageLoader, Prefetcher},
        resolve::{AssetResolver, ImageRef},
    },
    foundation::{
        core::{BezPath, Point, Vec2},
        error::{StorypathError, StorypathResult},
    },
    geometry::curve::{GeometryProvider, PathCurve},
    render::{
        responsive::ResponsiveStyleBuilder,
        stage::{Layer, NodeId, NodeKind, Origin, Stage},
    },
    scene::{
        index::{AvatarIdx, SceneIndex},
        model::{Avatar, CostumeChange, Element, Event, Location, NarrowOverrides, SceneOptions},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Path measurements taken once per materialization or resync.
pub struct PathMeta {
    /// Total arc length.
    pub length: f64,
    /// Signed bounding-box height; negative for paths running upward.
    pub height: f64,
    /// Point at distance zero.
    pub start: Point,
}

impl PathMeta {
    fn measure(curve: &PathCurve) -> Self {
        Self {
            length: curve.length(),
            height: curve.signed_height(),
            start: curve.start(),
        }
    }
}

#[derive(Clone, Debug)]
/// Costume change bound to its path point and image.
pub struct ComposedCostume {
    /// Model record.
    pub change: CostumeChange,
    /// Replacement image.
    pub image: ImageRef,
    /// Path point at the change position.
    pub anchor: Point,
}

#[derive(Clone, Debug)]
/// Element bound to its path point and node.
pub struct ComposedElement {
    /// Model record.
    pub element: Element,
    /// Path point at the element position (before offsets).
    pub anchor: Point,
    /// Visual node.
    pub node: NodeId,
}

#[derive(Clone, Debug)]
/// Location bound to its path point and node.
pub struct ComposedLocation {
    /// Model record.
    pub location: Location,
    /// Path point at the caption position (before offsets).
    pub anchor: Point,
    /// Visual node.
    pub node: NodeId,
}

#[derive(Clone, Debug)]
/// Event bound to its path point and node.
pub struct ComposedEvent {
    /// Model record.
    pub event: Event,
    /// Path point at the caption position (before offsets).
    pub anchor: Point,
    /// Visual node.
    pub node: NodeId,
}

#[derive(Clone, Debug)]
/// Avatar bound to its path curve and visual node, plus everything anchored on that path.
pub struct ComposedAvatar {
    /// Declaration index.
    pub idx: AvatarIdx,
    /// Model record.
    pub avatar: Avatar,
    /// Path curve named after the avatar.
    pub curve: PathCurve,
    /// Cached measurements of [`ComposedAvatar::curve`].
    pub meta: PathMeta,
    /// Avatar node.
    pub node: NodeId,
    /// Image shown before the first costume change.
    pub base_image: ImageRef,
    /// Costume changes in model order.
    pub costumes: Vec<ComposedCostume>,
    /// Elements in insertion order.
    pub elements: Vec<ComposedElement>,
    /// Locations in insertion order.
    pub locations: Vec<ComposedLocation>,
    /// Events in insertion order.
    pub events: Vec<ComposedEvent>,
}

#[derive(Clone, Debug)]
/// Materialized scene: geometry plus node handles, not yet scroll-driven.
pub struct ComposedScene {
    /// Scene-level options.
    pub options: SceneOptions,
    /// Avatars in declaration order.
    pub avatars: Vec<ComposedAvatar>,
}

/// Binds a [`SceneIndex`] to path geometry and creates the visual nodes.
#[derive(Clone, Debug, Default)]
pub struct Materializer {
    resolver: AssetResolver,
}

impl Materializer {
    /// Materializer resolving images with `resolver`.
    pub fn new(resolver: AssetResolver) -> Self {
        Self { resolver }
    }

    /// Resolver in use.
    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    #[tracing::instrument(skip(self, index, geometry, stage, prefetcher))]
    /// Materialize `index` against `geometry`, creating nodes on `stage`.
    ///
    /// Every curve is resolved before the first node is created, so a failure leaves `stage`
    /// untouched.
    pub fn compose<L: ImageLoader>(
        &self,
        index: &SceneIndex,
        geometry: &dyn GeometryProvider,
        stage: &mut Stage,
        prefetcher: &mut Prefetcher<L>,
    ) -> StorypathResult<ComposedScene> {
        let curves = bind_curves(index, geometry)?;
        let options = index.scene().options;

        let mut avatars = Vec::with_capacity(curves.len());
        for ((idx, avatar), curve) in index.avatars().zip(curves) {
            let node = stage.create(
                NodeKind::Avatar {
                    avatar: avatar.name.clone(),
                },
                Layer::Avatars,
                Origin::TopCenter,
            );
            let base_image = ImageRef::avatar(&avatar.name);
            stage.set_image(node, base_image.clone(), self.resolver.uri(&base_image));
            stage.set_visible(node, !avatar.initially_hidden);

            let costumes = avatar
                .costume_changes
                .iter()
                .map(|change| {
                    let image = ImageRef::costume(&avatar.name, &change.new_costume);
                    prefetcher.prefetch(&self.resolver.uri(&image));
                    ComposedCostume {
                        change: change.clone(),
                        image,
                        anchor: Point::ZERO,
                    }
                })
                .collect();

            let elements = index
                .elements(idx)
                .map(|element| {
                    let layer = if element.show_in_front_of_avatar {
                        Layer::InFrontOfAvatars
                    } else {
                        Layer::BehindAvatars
                    };
                    let node = stage.create(
                        NodeKind::Element {
                            name: element.name.clone(),
                        },
                        layer,
                        Origin::TopLeft,
                    );
                    let image = ImageRef::element(&element.name);
                    stage.set_image(node, image.clone(), self.resolver.uri(&image));
                    ComposedElement {
                        element: element.clone(),
                        anchor: Point::ZERO,
                        node,
                    }
                })
                .collect();

            let locations = index
                .locations(idx)
                .map(|location| ComposedLocation {
                    location: location.clone(),
                    anchor: Point::ZERO,
                    node: stage.create(
                        NodeKind::Location {
                            title: location.title.clone(),
                        },
                        Layer::BehindAvatars,
                        Origin::TopLeft,
                    ),
                })
                .collect();

            let events = index
                .events(idx)
                .map(|event| ComposedEvent {
                    event: event.clone(),
                    anchor: Point::ZERO,
                    node: stage.create(
                        NodeKind::Event {
                            title: event.title.clone(),
                            date: event.date.clone(),
                        },
                        Layer::BehindAvatars,
                        Origin::TopLeft,
                    ),
                })
                .collect();

            let mut composed = ComposedAvatar {
                idx,
                avatar: avatar.clone(),
                meta: PathMeta::measure(&curve),
                curve,
                node,
                base_image,
                costumes,
                elements,
                locations,
                events,
            };
            layout_avatar(&mut composed, options.narrow_viewport_max_width_px, stage);
            avatars.push(composed);
        }

        Ok(ComposedScene { options, avatars })
    }

    #[tracing::instrument(skip(self, scene, index, geometry, stage))]
    /// Re-read geometry after a resize and move every anchored node, keeping nodes and images.
    pub fn relayout(
        &self,
        scene: &mut ComposedScene,
        index: &SceneIndex,
        geometry: &dyn GeometryProvider,
        stage: &mut Stage,
    ) -> StorypathResult<()> {
        let curves = bind_curves(index, geometry)?;
        let max_width = scene.options.narrow_viewport_max_width_px;
        for (composed, curve) in scene.avatars.iter_mut().zip(curves) {
            composed.meta = PathMeta::measure(&curve);
            composed.curve = curve;
            layout_avatar(composed, max_width, stage);
        }
        Ok(())
    }
}

/// Resolve one curve per avatar, in declaration order.
fn bind_curves(
    index: &SceneIndex,
    geometry: &dyn GeometryProvider,
) -> StorypathResult<Vec<PathCurve>> {
    let mut by_id: HashMap<String, BezPath> = HashMap::new();
    for curve in geometry.curves()? {
        if curve.id.is_empty() {
            continue;
        }
        if by_id.contains_key(&curve.id) {
            return Err(StorypathError::id_conflict(curve.id));
        }
        by_id.insert(curve.id, curve.path);
    }

    index
        .avatars()
        .map(|(_, avatar)| {
            let path = by_id
                .remove(&avatar.name)
                .ok_or_else(|| StorypathError::missing_path(&avatar.name))?;
            PathCurve::new(path)
        })
        .collect()
}

fn layout_avatar(composed: &mut ComposedAvatar, max_width: f64, stage: &mut Stage) {
    let curve = &composed.curve;
    let avatar = &composed.avatar;

    stage.set_position(composed.node, composed.meta.start);
    stage.set_size(composed.node, avatar.size);
    let identity = format!("{}:avatar:{}", composed.node.as_u32(), avatar.name);
    let mut rule = ResponsiveStyleBuilder::new(&identity);
    if let Some(size) = avatar.mobile_size {
        rule = rule
            .mobile_px_opt("width", size.width)
            .mobile_px_opt("height", size.height);
    }
    stage.attach_style(composed.node, rule.compile(max_width));

    for costume in &mut composed.costumes {
        costume.anchor = curve.point_at_fraction(costume.change.position.fraction());
    }

    for e in &mut composed.elements {
        e.anchor = curve.point_at_fraction(e.element.position.fraction());
        stage.set_position(e.node, e.anchor + Vec2::new(e.element.x_offset, 0.0));
        stage.set_size(e.node, e.element.size);
        let rule = narrow_rule(e.node, &e.element.name, e.anchor, &e.element.mobile);
        stage.attach_style(e.node, rule.compile(max_width));
    }

    for l in &mut composed.locations {
        l.anchor = curve.point_at_fraction(l.location.position.fraction());
        stage.set_position(l.node, l.anchor + Vec2::new(l.location.x_offset, 0.0));
        let rule = narrow_rule(l.node, &l.location.title, l.anchor, &l.location.mobile);
        stage.attach_style(l.node, rule.compile(max_width));
    }

    for ev in &mut composed.events {
        ev.anchor = curve.point_at_fraction(ev.event.position.fraction());
        stage.set_position(ev.node, ev.anchor + Vec2::new(ev.event.x_offset, 0.0));
        let rule = narrow_rule(ev.node, &ev.event.title, ev.anchor, &ev.event.mobile);
        stage.attach_style(ev.node, rule.compile(max_width));
    }
}

fn narrow_rule(
    node: NodeId,
    label: &str,
    anchor: Point,
    mobile: &NarrowOverrides,
) -> ResponsiveStyleBuilder {
    ResponsiveStyleBuilder::new(&format!("{}:{label}", node.as_u32()))
        .mobile_px_opt("left", mobile.x_offset.map(|x| anchor.x + x))
        .mobile_px_opt("top", mobile.y_offset.map(|y| anchor.y + y))
        .mobile_px_opt("width", mobile.size.and_then(|s| s.width))
        .mobile_px_opt("height", mobile.size.and_then(|s| s.height))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/materializer.rs"]
mod tests;
