use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(tag = "namespace", rename_all = "snake_case")]
/// Logical image reference. Resolution to a URI is left to [`AssetResolver`].
pub enum ImageRef {
    /// Base image of an avatar.
    Avatar {
        /// Avatar name.
        avatar: String,
    },
    /// Costume image of an avatar.
    Costume {
        /// Avatar name.
        avatar: String,
        /// Costume name.
        costume: String,
    },
    /// Decorative element image.
    Element {
        /// Element name.
        name: String,
    },
}

impl ImageRef {
    /// Base image for `avatar`.
    pub fn avatar(avatar: impl Into<String>) -> Self {
        Self::Avatar {
            avatar: avatar.into(),
        }
    }

    /// Costume image `costume` for `avatar`.
    pub fn costume(avatar: impl Into<String>, costume: impl Into<String>) -> Self {
        Self::Costume {
            avatar: avatar.into(),
            costume: costume.into(),
        }
    }

    /// Decorative element image `name`.
    pub fn element(name: impl Into<String>) -> Self {
        Self::Element { name: name.into() }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Avatar { avatar } => write!(f, "avatar:{avatar}"),
            Self::Costume { avatar, costume } => write!(f, "costume:{avatar}/{costume}"),
            Self::Element { name } => write!(f, "element:{name}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Maps [`ImageRef`]s to retrievable URIs under a base path.
pub struct AssetResolver {
    /// Base path or URL, without trailing slash.
    pub base: String,
    /// File extension of every image.
    pub extension: String,
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self {
            base: "images".to_string(),
            extension: "png".to_string(),
        }
    }
}

impl AssetResolver {
    /// Resolver rooted at `base`.
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// URI of `image`.
    pub fn uri(&self, image: &ImageRef) -> String {
        let (base, ext) = (&self.base, &self.extension);
        match image {
            ImageRef::Avatar { avatar } => format!("{base}/avatars/{avatar}.{ext}"),
            ImageRef::Costume { avatar, costume } => {
                format!("{base}/avatars/{avatar}/costumes/{costume}.{ext}")
            }
            ImageRef::Element { name } => format!("{base}/elements/{name}.{ext}"),
        }
    }
}
