//! Biome identifiers.

use std::borrow::Cow;

/// A namespaced biome id such as `minecraft:plains`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeType {
    id: Cow<'static, str>,
}

impl BiomeType {
    pub const PLAINS: Self = Self::from_static("minecraft:plains");
    pub const OCEAN: Self = Self::from_static("minecraft:ocean");
    pub const DESERT: Self = Self::from_static("minecraft:desert");

    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self {
            id: Cow::Borrowed(id),
        }
    }

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = if id.contains(':') {
            id
        } else {
            format!("minecraft:{id}")
        };
        Self { id: Cow::Owned(id) }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for BiomeType {
    fn default() -> Self {
        Self::PLAINS
    }
}
