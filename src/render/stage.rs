use std::collections::BTreeMap;

use crate::{
    assets::resolve::ImageRef,
    foundation::core::{Point, Size},
    render::responsive::StyleRule,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
/// Handle to a node owned by a [`Stage`].
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw index.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// What a node displays.
pub enum NodeKind {
    /// Avatar image.
    Avatar {
        /// Avatar name.
        avatar: String,
    },
    /// Decorative element image.
    Element {
        /// Element name.
        name: String,
    },
    /// Location caption.
    Location {
        /// Caption title.
        title: String,
    },
    /// Dated event caption.
    Event {
        /// Caption title.
        title: String,
        /// Display date.
        date: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Paint layer, back to front.
pub enum Layer {
    /// Below the avatars.
    BehindAvatars,
    /// The avatar layer.
    Avatars,
    /// Above the avatars.
    InFrontOfAvatars,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Which point of the node box sits on [`VisualNode::position`].
pub enum Origin {
    /// Top-left corner.
    TopLeft,
    /// Middle of the top edge; the host centers the node horizontally on its position.
    TopCenter,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Presentation state of one node, read by the host every frame.
pub struct VisualNode {
    /// Handle.
    pub id: NodeId,
    /// What the node displays.
    pub kind: NodeKind,
    /// Displayed image, for image nodes.
    pub image: Option<ImageRef>,
    /// Resolved URI of [`VisualNode::image`].
    pub image_uri: Option<String>,
    /// Document position of [`VisualNode::origin`].
    pub position: Point,
    /// Anchor point of the node box.
    pub origin: Origin,
    /// Wide-viewport size; `None` keeps the intrinsic size.
    pub size: Option<Size>,
    /// Paint layer.
    pub layer: Layer,
    /// Whether the node is displayed.
    pub visible: bool,
    /// Generated class carrying the narrow-viewport rule, if any.
    pub class_name: Option<String>,
}

impl VisualNode {
    /// Left edge for a node rendered `rendered_width` pixels wide.
    pub fn left(&self, rendered_width: f64) -> f64 {
        match self.origin {
            Origin::TopLeft => self.position.x,
            Origin::TopCenter => self.position.x - rendered_width / 2.0,
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize)]
/// Retained set of visual nodes plus the responsive stylesheet.
pub struct Stage {
    nodes: Vec<VisualNode>,
    styles: BTreeMap<String, StyleRule>,
}

impl Stage {
    /// Empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visible node at the origin of the document.
    pub fn create(&mut self, kind: NodeKind, layer: Layer, origin: Origin) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(VisualNode {
            id,
            kind,
            image: None,
            image_uri: None,
            position: Point::ZERO,
            origin,
            size: None,
            layer,
            visible: true,
            class_name: None,
        });
        id
    }

    /// Node `id`. Panics on a handle from another stage.
    pub fn node(&self, id: NodeId) -> &VisualNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut VisualNode {
        &mut self.nodes[id.0 as usize]
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    /// Nodes of `layer`, in creation order.
    pub fn nodes_in_layer(&self, layer: Layer) -> impl Iterator<Item = &VisualNode> {
        self.nodes.iter().filter(move |n| n.layer == layer)
    }

    /// Move a node.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.node_mut(id).position = position;
    }

    /// Show or hide a node. Returns `true` if visibility changed.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        let node = self.node_mut(id);
        let changed = node.visible != visible;
        node.visible = visible;
        changed
    }

    /// Set a node's wide-viewport size.
    pub fn set_size(&mut self, id: NodeId, size: Option<Size>) {
        self.node_mut(id).size = size;
    }

    /// Swap a node's image.
    pub fn set_image(&mut self, id: NodeId, image: ImageRef, uri: String) {
        let node = self.node_mut(id);
        node.image = Some(image);
        node.image_uri = Some(uri);
    }

    /// Attach `rule` to a node, replacing the node's previous rule. `None` detaches.
    pub fn attach_style(&mut self, id: NodeId, rule: Option<StyleRule>) {
        if let Some(old) = self.node_mut(id).class_name.take() {
            self.styles.remove(&old);
        }
        if let Some(rule) = rule {
            self.node_mut(id).class_name = Some(rule.class_name.clone());
            self.styles.insert(rule.class_name.clone(), rule);
        }
    }

    /// Rule attached to `class_name`.
    pub fn style(&self, class_name: &str) -> Option<&StyleRule> {
        self.styles.get(class_name)
    }

    /// Number of rules in the stylesheet.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Whole stylesheet as CSS, ordered by class name.
    pub fn stylesheet(&self) -> String {
        self.styles.values().map(StyleRule::to_css).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/stage.rs"]
mod tests;
