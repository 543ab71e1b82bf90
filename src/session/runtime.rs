use crate::{
    assets::{
        prefetch::{ImageLoader, Prefetcher},
        resolve::AssetResolver,
    },
    compose::materializer::Materializer,
    foundation::error::StorypathResult,
    geometry::curve::{GeometryProvider, ViewportGeometry},
    render::stage::Stage,
    scene::{
        index::SceneIndex,
        model::{Scene, ScrollMode},
    },
    session::scroll::{ListenerId, ScrollPosition, UserScrollEvent, UserScrollListeners},
    sync::{
        synchronizer::{ScrollSynchronizer, SyncOptions, TickReport},
        tween::TweenScheduler,
    },
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Runtime configuration of a [`StorySession`].
pub struct SessionConfig {
    /// Image URI resolution.
    #[serde(default)]
    pub assets: AssetResolver,
    /// Synchronizer knobs.
    #[serde(default)]
    pub sync: SyncOptions,
}

/// A running scene: model, geometry, nodes and the scroll loop wired together.
pub struct StorySession<G, S, L> {
    index: SceneIndex,
    geometry: G,
    materializer: Materializer,
    stage: Stage,
    prefetcher: Prefetcher<L>,
    sync: ScrollSynchronizer<S>,
    scroll: ScrollPosition,
    extent_override: Option<f64>,
    listeners: UserScrollListeners,
}

impl<G, S, L> StorySession<G, S, L>
where
    G: GeometryProvider,
    S: TweenScheduler,
    L: ImageLoader,
{
    #[tracing::instrument(skip_all)]
    /// Validate `scene`, materialize it against `geometry`, and hand it to a synchronizer.
    ///
    /// The scroll extent starts at the offset that passes every avatar span.
    pub fn new(
        scene: Scene,
        geometry: G,
        config: SessionConfig,
        scheduler: S,
        loader: L,
    ) -> StorypathResult<Self> {
        let mode = scene.options.scroll_mode;
        let index = SceneIndex::new(scene)?;
        let materializer = Materializer::new(config.assets.clone());
        let mut stage = Stage::new();
        let mut prefetcher = Prefetcher::new(loader);
        let composed = materializer.compose(&index, &geometry, &mut stage, &mut prefetcher)?;
        let sync = ScrollSynchronizer::new(composed, config.assets, config.sync, scheduler)?;
        let scroll = ScrollPosition::new(mode, sync.completion_offset())?;
        tracing::info!(
            avatars = index.len(),
            nodes = stage.nodes().len(),
            "story session ready"
        );
        Ok(Self {
            index,
            geometry,
            materializer,
            stage,
            prefetcher,
            sync,
            scroll,
            extent_override: None,
            listeners: UserScrollListeners::new(),
        })
    }

    /// Scene index.
    pub fn index(&self) -> &SceneIndex {
        &self.index
    }

    /// Nodes for the host to present.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Synchronizer.
    pub fn synchronizer(&self) -> &ScrollSynchronizer<S> {
        &self.sync
    }

    /// Image prefetcher.
    pub fn prefetcher(&self) -> &Prefetcher<L> {
        &self.prefetcher
    }

    /// Current geometry provider.
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Current scroll offset.
    pub fn offset(&self) -> f64 {
        self.scroll.offset()
    }

    /// Largest reachable offset.
    pub fn scroll_extent(&self) -> f64 {
        self.scroll.extent()
    }

    /// Override the reachable range, e.g. with the measured document height. Survives resyncs.
    pub fn set_scroll_extent(&mut self, extent: f64) -> StorypathResult<()> {
        self.scroll.set_extent(extent)?;
        self.extent_override = Some(extent);
        Ok(())
    }

    /// Subscribe to user scroll gestures.
    pub fn add_user_scroll_listener(
        &mut self,
        listener: impl FnMut(&UserScrollEvent) + 'static,
    ) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Unsubscribe a user scroll listener.
    pub fn remove_user_scroll_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// The scroll offset changed to `offset`.
    pub fn on_scroll(&mut self, offset: f64) -> StorypathResult<TickReport> {
        let offset = self.scroll.set(offset)?;
        self.sync.on_scroll(offset, &mut self.stage)
    }

    /// The user scrolled by `delta`. Listeners are notified; a delegated offset moves and ticks.
    pub fn on_user_scroll(&mut self, delta: f64) -> StorypathResult<Option<TickReport>> {
        let before = self.scroll.offset();
        let offset = self.scroll.apply_delta(delta)?;
        self.listeners.notify(&UserScrollEvent { delta, offset });
        if offset == before && self.sync.last_offset().is_some() {
            return Ok(None);
        }
        match self.scroll.mode() {
            ScrollMode::Delegated => self.sync.on_scroll(offset, &mut self.stage).map(Some),
            ScrollMode::Native => Ok(None),
        }
    }

    /// Scroll to the offset that passes every avatar span, inside the extent.
    pub fn scroll_to_bottom(&mut self) -> StorypathResult<TickReport> {
        let target = self.sync.completion_offset().min(self.scroll.extent());
        self.on_scroll(target)
    }

    /// Geometry was changed through [`StorySession::geometry_mut`]; re-derive every trigger.
    pub fn resync(&mut self) -> StorypathResult<Option<TickReport>> {
        let report = self
            .sync
            .resync(&self.materializer, &self.index, &self.geometry, &mut self.stage)?;
        let extent = self
            .extent_override
            .unwrap_or_else(|| self.sync.completion_offset());
        self.scroll.set_extent(extent)?;
        Ok(report)
    }

    /// Geometry provider, mutably. Call [`StorySession::resync`] afterwards.
    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }
}

impl<G, S, L> StorySession<G, S, L>
where
    G: ViewportGeometry,
    S: TweenScheduler,
    L: ImageLoader,
{
    /// The viewport is now `width` pixels wide.
    pub fn on_resize(&mut self, width: f64) -> StorypathResult<Option<TickReport>> {
        self.geometry.set_viewport_width(width)?;
        self.resync()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/runtime.rs"]
mod tests;
