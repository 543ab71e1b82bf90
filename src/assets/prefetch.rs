use std::collections::HashSet;

/// Host hook that starts loading an image URI in the background.
pub trait ImageLoader {
    /// Begin fetching `uri`. Best effort; failures are the host's concern.
    fn request(&mut self, uri: &str);
}

#[derive(Clone, Debug, Default)]
/// Loader that only records what was requested.
pub struct RecordingLoader {
    /// URIs in request order.
    pub requested: Vec<String>,
}

impl ImageLoader for RecordingLoader {
    fn request(&mut self, uri: &str) {
        self.requested.push(uri.to_string());
    }
}

/// Deduplicating front for an [`ImageLoader`]: each unique URI is requested at most once.
#[derive(Debug, Default)]
pub struct Prefetcher<L> {
    loader: L,
    seen: HashSet<String>,
}

impl<L: ImageLoader> Prefetcher<L> {
    /// Wrap `loader`.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            seen: HashSet::new(),
        }
    }

    /// Request `uri` unless it was requested before. Returns `true` if a request was issued.
    pub fn prefetch(&mut self, uri: &str) -> bool {
        if self.seen.contains(uri) {
            return false;
        }
        self.seen.insert(uri.to_string());
        self.loader.request(uri);
        true
    }

    /// Wrapped loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Number of distinct URIs requested so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// `true` if nothing was requested yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
