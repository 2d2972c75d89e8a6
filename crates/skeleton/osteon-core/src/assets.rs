//! Asset boundary: where skeleton documents and atlases come from.
//!
//! The core crate never touches the file system. Hosts implement
//! [`AssetProvider`] over whatever storage they use.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::atlas::TextureAtlas;
use crate::error::LoadError;

/// Resolves resource names to skeleton documents and atlases.
pub trait AssetProvider {
    /// Raw skeleton document (JSON) for `name`.
    fn skeleton_document(&self, name: &str) -> Option<String>;
    /// Pre-built atlas registered under `name`.
    fn atlas(&self, name: &str) -> Option<Arc<TextureAtlas>>;
}

/// Where the atlas for a load comes from.
#[derive(Clone, Debug)]
pub enum AtlasSource {
    /// Resolve through the asset provider by name.
    Named(String),
    /// Already constructed by the caller.
    Loaded(Arc<TextureAtlas>),
}

impl AtlasSource {
    pub fn resolve(&self, assets: &dyn AssetProvider) -> Result<Arc<TextureAtlas>, LoadError> {
        match self {
            AtlasSource::Named(name) => {
                assets
                    .atlas(name)
                    .ok_or_else(|| LoadError::MissingAtlas { name: name.clone() })
            }
            AtlasSource::Loaded(atlas) => Ok(Arc::clone(atlas)),
        }
    }
}

impl From<&str> for AtlasSource {
    fn from(name: &str) -> Self {
        AtlasSource::Named(name.to_string())
    }
}

impl From<String> for AtlasSource {
    fn from(name: String) -> Self {
        AtlasSource::Named(name)
    }
}

impl From<TextureAtlas> for AtlasSource {
    fn from(atlas: TextureAtlas) -> Self {
        AtlasSource::Loaded(Arc::new(atlas))
    }
}

impl From<Arc<TextureAtlas>> for AtlasSource {
    fn from(atlas: Arc<TextureAtlas>) -> Self {
        AtlasSource::Loaded(atlas)
    }
}

/// In-memory provider for tests and hosts that preload everything.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    skeletons: HashMap<String, String>,
    atlases: HashMap<String, Arc<TextureAtlas>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_skeleton(&mut self, name: impl Into<String>, document: impl Into<String>) {
        self.skeletons.insert(name.into(), document.into());
    }

    pub fn insert_atlas(&mut self, name: impl Into<String>, atlas: impl Into<Arc<TextureAtlas>>) {
        self.atlases.insert(name.into(), atlas.into());
    }

    pub fn with_skeleton(mut self, name: impl Into<String>, document: impl Into<String>) -> Self {
        self.insert_skeleton(name, document);
        self
    }

    pub fn with_atlas(mut self, name: impl Into<String>, atlas: impl Into<Arc<TextureAtlas>>) -> Self {
        self.insert_atlas(name, atlas);
        self
    }
}

impl AssetProvider for MemoryAssets {
    fn skeleton_document(&self, name: &str) -> Option<String> {
        self.skeletons.get(name).cloned()
    }

    fn atlas(&self, name: &str) -> Option<Arc<TextureAtlas>> {
        self.atlases.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasRegion;

    #[test]
    fn named_source_resolves_through_provider() {
        let assets = MemoryAssets::new()
            .with_atlas("hero", TextureAtlas::new().with_region(AtlasRegion::new("head", "p")));
        let atlas = AtlasSource::from("hero").resolve(&assets).unwrap();
        assert!(atlas.contains("head"));
    }

    #[test]
    fn missing_named_atlas_is_a_load_error() {
        let assets = MemoryAssets::new();
        let err = AtlasSource::from("nope").resolve(&assets).unwrap_err();
        assert_eq!(err, LoadError::MissingAtlas { name: "nope".into() });
    }

    #[test]
    fn loaded_source_ignores_provider() {
        let atlas = TextureAtlas::new().with_region(AtlasRegion::new("x", "p"));
        let source = AtlasSource::from(atlas);
        let resolved = source.resolve(&MemoryAssets::new()).unwrap();
        assert!(resolved.contains("x"));
    }
}
