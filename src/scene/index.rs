use std::collections::HashMap;

use crate::{
    foundation::error::StorypathResult,
    scene::model::{Avatar, Element, Event, Location, Scene},
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Position of an avatar in declaration order.
pub struct AvatarIdx(pub usize);

#[derive(Clone, Debug, Default)]
struct AvatarEntries {
    elements: Vec<usize>,
    locations: Vec<usize>,
    events: Vec<usize>,
}

/// Validated scene plus name-keyed lookup tables, built once.
///
/// Both [`crate::Materializer`] and [`crate::ScrollSynchronizer`] borrow the same index instead
/// of re-deriving per-avatar tables.
#[derive(Clone, Debug)]
pub struct SceneIndex {
    scene: Scene,
    by_name: HashMap<String, AvatarIdx>,
    entries: Vec<AvatarEntries>,
}

impl SceneIndex {
    /// Validate `scene` and index it.
    pub fn new(scene: Scene) -> StorypathResult<Self> {
        scene.validate()?;

        let by_name: HashMap<String, AvatarIdx> = scene
            .avatars
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.clone(), AvatarIdx(i)))
            .collect();

        let mut entries = vec![AvatarEntries::default(); scene.avatars.len()];
        // `validate` guarantees every lookup below succeeds.
        for (i, e) in scene.elements.iter().enumerate() {
            if let Some(idx) = by_name.get(&e.avatar) {
                entries[idx.0].elements.push(i);
            }
        }
        for (i, l) in scene.locations.iter().enumerate() {
            if let Some(idx) = by_name.get(&l.avatar) {
                entries[idx.0].locations.push(i);
            }
        }
        for (i, ev) in scene.events.iter().enumerate() {
            if let Some(idx) = by_name.get(&ev.avatar) {
                entries[idx.0].events.push(i);
            }
        }

        Ok(Self {
            scene,
            by_name,
            entries,
        })
    }

    /// Underlying scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of avatars.
    pub fn len(&self) -> usize {
        self.scene.avatars.len()
    }

    /// `true` if the scene declares no avatars.
    pub fn is_empty(&self) -> bool {
        self.scene.avatars.is_empty()
    }

    /// Index of the avatar called `name`.
    pub fn avatar_idx(&self, name: &str) -> Option<AvatarIdx> {
        self.by_name.get(name).copied()
    }

    /// Avatar at `idx`.
    pub fn avatar(&self, idx: AvatarIdx) -> &Avatar {
        &self.scene.avatars[idx.0]
    }

    /// Avatars with their indices, in declaration order.
    pub fn avatars(&self) -> impl Iterator<Item = (AvatarIdx, &Avatar)> {
        self.scene
            .avatars
            .iter()
            .enumerate()
            .map(|(i, a)| (AvatarIdx(i), a))
    }

    /// Elements anchored to `idx`, in insertion order.
    pub fn elements(&self, idx: AvatarIdx) -> impl Iterator<Item = &Element> {
        self.entries[idx.0]
            .elements
            .iter()
            .map(|&i| &self.scene.elements[i])
    }

    /// Locations anchored to `idx`, in insertion order.
    pub fn locations(&self, idx: AvatarIdx) -> impl Iterator<Item = &Location> {
        self.entries[idx.0]
            .locations
            .iter()
            .map(|&i| &self.scene.locations[i])
    }

    /// Events anchored to `idx`, in insertion order.
    pub fn events(&self, idx: AvatarIdx) -> impl Iterator<Item = &Event> {
        self.entries[idx.0]
            .events
            .iter()
            .map(|&i| &self.scene.events[i])
    }
}
