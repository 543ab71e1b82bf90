use crate::{
    foundation::{
        core::Size,
        error::{StorypathError, StorypathResult},
        position::PathPosition,
    },
    scene::model::{
        Avatar, CostumeChange, Element, Event, Location, NarrowOverrides, Scene, SceneOptions,
    },
};

#[derive(Clone, Debug, Default)]
/// Options for [`SceneBuilder::add_avatar`].
pub struct AvatarOptions {
    /// Default on-screen size.
    pub size: Option<Size>,
    /// Narrow-viewport size override.
    pub mobile_size: Option<Size>,
    /// Hidden until the avatar first enters its path.
    pub initially_hidden: bool,
    /// Hidden once the avatar scrolls past the end of its path.
    pub hide_on_exit: bool,
    /// Per-avatar scroll-offset bias.
    pub offset_top: f64,
    /// Avatars this one is hidden together with.
    pub shows_with: Vec<String>,
    /// Avatars that must all be hidden before this one may appear.
    pub shows_after: Vec<String>,
}

#[derive(Clone, Debug)]
/// Options for [`SceneBuilder::add_element`].
pub struct ElementOptions {
    /// Avatar whose path the element is anchored to.
    pub avatar: String,
    /// Percentage string, e.g. `"30%"`.
    pub position: String,
    /// Horizontal offset from the path point.
    pub x_offset: f64,
    /// On-screen size.
    pub size: Option<Size>,
    /// Skip the appear transition.
    pub disable_animation: bool,
    /// Render above the avatar layer.
    pub show_in_front_of_avatar: bool,
    /// Narrow-viewport overrides.
    pub mobile: NarrowOverrides,
}

impl ElementOptions {
    /// Element on `avatar`'s path at `position`, everything else defaulted.
    pub fn new(avatar: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            avatar: avatar.into(),
            position: position.into(),
            x_offset: 0.0,
            size: None,
            disable_animation: false,
            show_in_front_of_avatar: false,
            mobile: NarrowOverrides::default(),
        }
    }
}

#[derive(Clone, Debug)]
/// Options for [`SceneBuilder::add_location`].
pub struct LocationOptions {
    /// Avatar whose path the caption is anchored to.
    pub avatar: String,
    /// Percentage string.
    pub position: String,
    /// Horizontal offset from the path point.
    pub x_offset: f64,
    /// Narrow-viewport overrides.
    pub mobile: NarrowOverrides,
}

impl LocationOptions {
    /// Location on `avatar`'s path at `position`.
    pub fn new(avatar: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            avatar: avatar.into(),
            position: position.into(),
            x_offset: 0.0,
            mobile: NarrowOverrides::default(),
        }
    }
}

#[derive(Clone, Debug)]
/// Options for [`SceneBuilder::add_event`].
pub struct EventOptions {
    /// Display date, already formatted.
    pub date: String,
    /// Avatar whose path the caption is anchored to.
    pub avatar: String,
    /// Percentage string.
    pub position: String,
    /// Horizontal offset from the path point.
    pub x_offset: f64,
    /// Narrow-viewport overrides.
    pub mobile: NarrowOverrides,
}

impl EventOptions {
    /// Event dated `date` on `avatar`'s path at `position`.
    pub fn new(
        date: impl Into<String>,
        avatar: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            avatar: avatar.into(),
            position: position.into(),
            x_offset: 0.0,
            mobile: NarrowOverrides::default(),
        }
    }
}

/// Registration-phase builder for a [`Scene`].
///
/// Avatar names are checked for uniqueness and costume changes for a known avatar as they are
/// added; every other avatar reference is checked once, in [`SceneBuilder::build`].
pub struct SceneBuilder {
    scene: Scene,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new(SceneOptions::default())
    }
}

impl SceneBuilder {
    /// Start a scene with `options`.
    pub fn new(options: SceneOptions) -> Self {
        Self {
            scene: Scene::new(options),
        }
    }

    /// Set the global top offset.
    pub fn offset_top(mut self, px: f64) -> Self {
        self.scene.options.offset_top = px;
        self
    }

    /// Declare an avatar. Fails if `name` is already declared.
    pub fn add_avatar(
        mut self,
        name: impl Into<String>,
        opts: AvatarOptions,
    ) -> StorypathResult<Self> {
        let name = name.into();
        if self.scene.avatar(&name).is_some() {
            return Err(StorypathError::validation(format!(
                "duplicate avatar name '{name}'"
            )));
        }
        self.scene.avatars.push(Avatar {
            name,
            size: opts.size,
            mobile_size: opts.mobile_size,
            initially_hidden: opts.initially_hidden,
            hide_on_exit: opts.hide_on_exit,
            offset_top: opts.offset_top,
            costume_changes: Vec::new(),
            shows_with: opts.shows_with,
            shows_after: opts.shows_after,
        });
        Ok(self)
    }

    /// Anchor a decorative image named `name`.
    pub fn add_element(
        mut self,
        name: impl Into<String>,
        opts: ElementOptions,
    ) -> StorypathResult<Self> {
        let position = PathPosition::parse(&opts.position)?;
        self.scene.elements.push(Element {
            name: name.into(),
            avatar: opts.avatar,
            position,
            x_offset: opts.x_offset,
            size: opts.size,
            disable_animation: opts.disable_animation,
            show_in_front_of_avatar: opts.show_in_front_of_avatar,
            mobile: opts.mobile,
        });
        Ok(self)
    }

    /// Anchor a location caption titled `title`.
    pub fn add_location(
        mut self,
        title: impl Into<String>,
        opts: LocationOptions,
    ) -> StorypathResult<Self> {
        let position = PathPosition::parse(&opts.position)?;
        self.scene.locations.push(Location {
            title: title.into(),
            avatar: opts.avatar,
            position,
            x_offset: opts.x_offset,
            mobile: opts.mobile,
        });
        Ok(self)
    }

    /// Anchor a dated event caption titled `title`.
    pub fn add_event(
        mut self,
        title: impl Into<String>,
        opts: EventOptions,
    ) -> StorypathResult<Self> {
        let title = title.into();
        if opts.date.trim().is_empty() {
            return Err(StorypathError::validation(format!(
                "event '{title}' needs a resolved display date"
            )));
        }
        let position = PathPosition::parse(&opts.position)?;
        self.scene.events.push(Event {
            title,
            date: opts.date,
            avatar: opts.avatar,
            position,
            x_offset: opts.x_offset,
            mobile: opts.mobile,
        });
        Ok(self)
    }

    /// Append a costume change to `avatar`. Fails if the avatar is not declared yet.
    ///
    /// Changes are kept in insertion order; callers add them by ascending position.
    pub fn add_costume_change(
        mut self,
        avatar: &str,
        new_costume: impl Into<String>,
        position: &str,
    ) -> StorypathResult<Self> {
        let position = PathPosition::parse(position)?;
        let Some(target) = self.scene.avatars.iter_mut().find(|a| a.name == avatar) else {
            return Err(StorypathError::validation(format!(
                "costume change references unknown avatar '{avatar}'"
            )));
        };
        target.costume_changes.push(CostumeChange {
            position,
            new_costume: new_costume.into(),
        });
        Ok(self)
    }

    #[tracing::instrument(skip(self))]
    /// Validate and produce the immutable [`Scene`].
    pub fn build(self) -> StorypathResult<Scene> {
        self.scene.validate()?;
        Ok(self.scene)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/dsl.rs"]
mod tests;
