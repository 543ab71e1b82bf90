/// Crate-wide result alias.
pub type StorypathResult<T> = Result<T, StorypathError>;

#[derive(thiserror::Error, Debug)]
/// Errors raised while building, materializing, or synchronizing a scene.
pub enum StorypathError {
    /// Scene configuration is invalid (bad position, duplicate or unknown avatar, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Two path curves in the drawing share the same identifier.
    #[error("id conflict: two path curves share the id '{0}'")]
    IdConflict(String),

    /// An avatar has no path curve with a matching identifier.
    #[error("missing path: no path curve with id '{0}'")]
    MissingPath(String),

    /// Drawing or curve geometry is malformed.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// A visibility-coupling reference could not be resolved at runtime.
    #[error("visibility coupling error: {0}")]
    Coupling(String),

    /// Scene description could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, typically IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StorypathError {
    /// Build a [`StorypathError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StorypathError::IdConflict`] for curve id `id`.
    pub fn id_conflict(id: impl Into<String>) -> Self {
        Self::IdConflict(id.into())
    }

    /// Build a [`StorypathError::MissingPath`] for avatar `name`.
    pub fn missing_path(name: impl Into<String>) -> Self {
        Self::MissingPath(name.into())
    }

    /// Build a [`StorypathError::Geometry`].
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`StorypathError::Coupling`].
    pub fn coupling(msg: impl Into<String>) -> Self {
        Self::Coupling(msg.into())
    }

    /// Build a [`StorypathError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
