use std::{collections::HashSet, path::Path};

use anyhow::Context;

use crate::foundation::{
    core::{Size, validate_finite},
    error::{StorypathError, StorypathResult},
    position::PathPosition,
};

/// Default narrow-viewport threshold (`max-width`) in CSS pixels.
pub const DEFAULT_NARROW_VIEWPORT_MAX_WIDTH_PX: f64 = 1096.0;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A complete scroll scene: avatars plus everything anchored along their paths.
///
/// A scene is a pure data model that can be:
/// - built programmatically (see [`crate::SceneBuilder`])
/// - loaded from JSON via [`Scene::from_json_str`] / [`Scene::from_path`]
///
/// Both routes end in [`Scene::validate`].
pub struct Scene {
    /// Scene-level options.
    #[serde(default)]
    pub options: SceneOptions,
    /// Avatars in declaration order. Declaration order is evaluation order on every tick.
    pub avatars: Vec<Avatar>,
    /// Decorative images, in insertion order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Map-pin captions, in insertion order.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Dated captions, in insertion order.
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Scene-wide settings.
pub struct SceneOptions {
    /// Global top offset added to every scroll offset.
    #[serde(default)]
    pub offset_top: f64,
    /// Who owns the scroll offset.
    #[serde(default)]
    pub scroll_mode: ScrollMode,
    /// `max-width` of the single narrow-viewport media condition.
    #[serde(default = "default_narrow_viewport_max_width_px")]
    pub narrow_viewport_max_width_px: f64,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            offset_top: 0.0,
            scroll_mode: ScrollMode::Native,
            narrow_viewport_max_width_px: DEFAULT_NARROW_VIEWPORT_MAX_WIDTH_PX,
        }
    }
}

fn default_narrow_viewport_max_width_px() -> f64 {
    DEFAULT_NARROW_VIEWPORT_MAX_WIDTH_PX
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Scroll ownership mode.
pub enum ScrollMode {
    /// The host (browser) controls the offset and reports it.
    #[default]
    Native,
    /// The session controls the offset and applies user scroll deltas itself.
    Delegated,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// A character travelling along the path curve that shares its name.
pub struct Avatar {
    /// Unique, case-sensitive name. Also the id of the avatar's path curve.
    pub name: String,
    /// Default on-screen size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Narrow-viewport size override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_size: Option<Size>,
    /// Hidden until the avatar first enters its path.
    #[serde(default)]
    pub initially_hidden: bool,
    /// Hidden again once the avatar scrolls past the end of its path.
    #[serde(default)]
    pub hide_on_exit: bool,
    /// Vertical scroll-offset bias for this avatar only.
    #[serde(default)]
    pub offset_top: f64,
    /// Costume swaps, applied in array order as scroll increases.
    #[serde(default)]
    pub costume_changes: Vec<CostumeChange>,
    /// Avatars this one is hidden together with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shows_with: Vec<String>,
    /// Avatars that must all be hidden before this one may appear.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shows_after: Vec<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Mid-path replacement of an avatar's image.
pub struct CostumeChange {
    /// Where along the path the swap happens.
    pub position: PathPosition,
    /// Costume image name, resolved in the avatar's costume namespace.
    pub new_costume: String,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq)]
/// Narrow-viewport overrides for an anchored node.
pub struct NarrowOverrides {
    /// Horizontal offset from the path point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_offset: Option<f64>,
    /// Vertical offset from the path point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_offset: Option<f64>,
    /// Size override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl NarrowOverrides {
    /// `true` if no override is set.
    pub fn is_empty(&self) -> bool {
        self.x_offset.is_none() && self.y_offset.is_none() && self.size.is_none()
    }

    fn validate(&self, field: &str) -> StorypathResult<()> {
        if let Some(x) = self.x_offset {
            validate_finite(x, &format!("{field}.x_offset"))?;
        }
        if let Some(y) = self.y_offset {
            validate_finite(y, &format!("{field}.y_offset"))?;
        }
        if let Some(size) = &self.size {
            size.validate(&format!("{field}.size"))?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Decorative image anchored to a fixed point on an avatar's path.
pub struct Element {
    /// Image name in the element namespace.
    pub name: String,
    /// Avatar whose path this element is anchored to.
    pub avatar: String,
    /// Anchor position along the path.
    pub position: PathPosition,
    /// Horizontal offset from the path point; negative moves left.
    #[serde(default)]
    pub x_offset: f64,
    /// On-screen size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Skip the appear transition.
    #[serde(default)]
    pub disable_animation: bool,
    /// Render above the avatar layer instead of below it.
    #[serde(default)]
    pub show_in_front_of_avatar: bool,
    /// Narrow-viewport overrides.
    #[serde(default, skip_serializing_if = "NarrowOverrides::is_empty")]
    pub mobile: NarrowOverrides,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// "Map pin + title" caption anchored on an avatar's path.
pub struct Location {
    /// Caption title.
    pub title: String,
    /// Avatar whose path this caption is anchored to.
    pub avatar: String,
    /// Anchor position along the path.
    pub position: PathPosition,
    /// Horizontal offset from the path point.
    #[serde(default)]
    pub x_offset: f64,
    /// Narrow-viewport overrides.
    #[serde(default, skip_serializing_if = "NarrowOverrides::is_empty")]
    pub mobile: NarrowOverrides,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Dated caption anchored on an avatar's path.
pub struct Event {
    /// Caption title.
    pub title: String,
    /// Display date, already formatted.
    pub date: String,
    /// Avatar whose path this caption is anchored to.
    pub avatar: String,
    /// Anchor position along the path.
    pub position: PathPosition,
    /// Horizontal offset from the path point.
    #[serde(default)]
    pub x_offset: f64,
    /// Narrow-viewport overrides.
    #[serde(default, skip_serializing_if = "NarrowOverrides::is_empty")]
    pub mobile: NarrowOverrides,
}

impl Scene {
    /// Empty scene with `options`.
    pub fn new(options: SceneOptions) -> Self {
        Self {
            options,
            avatars: Vec::new(),
            elements: Vec::new(),
            locations: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Parse and validate a JSON scene description.
    pub fn from_json_str(s: &str) -> StorypathResult<Self> {
        let scene: Self =
            serde_json::from_str(s).map_err(|e| StorypathError::serde(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Read, parse, and validate a JSON scene description from disk.
    pub fn from_path(path: impl AsRef<Path>) -> StorypathResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read scene from '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// All avatars in declaration order.
    pub fn avatars(&self) -> &[Avatar] {
        &self.avatars
    }

    /// Avatar named `name`, if declared.
    pub fn avatar(&self, name: &str) -> Option<&Avatar> {
        self.avatars.iter().find(|a| a.name == name)
    }

    /// Elements anchored to `avatar`, in insertion order. Empty if there are none.
    pub fn elements(&self, avatar: &str) -> Vec<&Element> {
        self.elements.iter().filter(|e| e.avatar == avatar).collect()
    }

    /// Locations anchored to `avatar`, in insertion order. Empty if there are none.
    pub fn locations(&self, avatar: &str) -> Vec<&Location> {
        self.locations.iter().filter(|l| l.avatar == avatar).collect()
    }

    /// Events anchored to `avatar`, in insertion order. Empty if there are none.
    pub fn events(&self, avatar: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.avatar == avatar).collect()
    }

    /// Validate scene invariants and avatar references.
    ///
    /// Visibility-coupling names (`shows_with` / `shows_after`) are not checked here: the
    /// synchronizer treats unknown peers as runtime drift.
    pub fn validate(&self) -> StorypathResult<()> {
        validate_finite(self.options.offset_top, "scene offset_top")?;
        if !self.options.narrow_viewport_max_width_px.is_finite()
            || self.options.narrow_viewport_max_width_px <= 0.0
        {
            return Err(StorypathError::validation(
                "scene narrow_viewport_max_width_px must be finite and > 0",
            ));
        }

        let mut names = HashSet::new();
        for avatar in &self.avatars {
            if avatar.name.trim().is_empty() {
                return Err(StorypathError::validation("avatar name must be non-empty"));
            }
            if !names.insert(avatar.name.as_str()) {
                return Err(StorypathError::validation(format!(
                    "duplicate avatar name '{}'",
                    avatar.name
                )));
            }
            validate_finite(avatar.offset_top, &format!("avatar '{}' offset_top", avatar.name))?;
            if let Some(size) = &avatar.size {
                size.validate(&format!("avatar '{}' size", avatar.name))?;
            }
            if let Some(size) = &avatar.mobile_size {
                size.validate(&format!("avatar '{}' mobile_size", avatar.name))?;
            }
            for change in &avatar.costume_changes {
                if change.new_costume.trim().is_empty() {
                    return Err(StorypathError::validation(format!(
                        "avatar '{}' has a costume change with an empty costume name",
                        avatar.name
                    )));
                }
            }
        }

        let known = |kind: &str, label: &str, avatar: &str| -> StorypathResult<()> {
            if names.contains(avatar) {
                Ok(())
            } else {
                Err(StorypathError::validation(format!(
                    "{kind} '{label}' references unknown avatar '{avatar}'"
                )))
            }
        };

        for e in &self.elements {
            if e.name.trim().is_empty() {
                return Err(StorypathError::validation("element name must be non-empty"));
            }
            known("element", &e.name, &e.avatar)?;
            validate_finite(e.x_offset, &format!("element '{}' x_offset", e.name))?;
            if let Some(size) = &e.size {
                size.validate(&format!("element '{}' size", e.name))?;
            }
            e.mobile.validate(&format!("element '{}' mobile", e.name))?;
        }
        for l in &self.locations {
            known("location", &l.title, &l.avatar)?;
            validate_finite(l.x_offset, &format!("location '{}' x_offset", l.title))?;
            l.mobile.validate(&format!("location '{}' mobile", l.title))?;
        }
        for ev in &self.events {
            known("event", &ev.title, &ev.avatar)?;
            if ev.date.trim().is_empty() {
                return Err(StorypathError::validation(format!(
                    "event '{}' needs a resolved display date",
                    ev.title
                )));
            }
            validate_finite(ev.x_offset, &format!("event '{}' x_offset", ev.title))?;
            ev.mobile.validate(&format!("event '{}' mobile", ev.title))?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
