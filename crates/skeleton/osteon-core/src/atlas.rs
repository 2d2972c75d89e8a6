//! Texture atlas: resolves region names to texture coordinates.
//!
//! Parsing packer output is out of scope; atlases are built in code or
//! deserialized from a small JSON document `{ "pages": [...], "regions": [...] }`.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A named rectangle on an atlas page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasRegion {
    pub name: String,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Region is stored rotated 90 degrees on the page.
    #[serde(default)]
    pub rotated: bool,
}

impl AtlasRegion {
    pub fn new(name: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page: page.into(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            rotated: false,
        }
    }

    pub fn with_rect(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }
}

#[derive(Deserialize)]
struct AtlasDocument {
    #[serde(default)]
    pages: Vec<String>,
    #[serde(default)]
    regions: Vec<AtlasRegion>,
}

/// Region lookup table. Later regions with the same name replace earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "AtlasDocument")]
pub struct TextureAtlas {
    pages: Vec<String>,
    regions: HashMap<String, AtlasRegion>,
}

impl From<AtlasDocument> for TextureAtlas {
    fn from(doc: AtlasDocument) -> Self {
        let mut atlas = TextureAtlas {
            pages: doc.pages,
            regions: HashMap::with_capacity(doc.regions.len()),
        };
        for region in doc.regions {
            atlas.insert(region);
        }
        atlas
    }
}

impl TextureAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region, registering its page if unseen.
    pub fn insert(&mut self, region: AtlasRegion) {
        if !region.page.is_empty() && !self.pages.iter().any(|p| *p == region.page) {
            self.pages.push(region.page.clone());
        }
        self.regions.insert(region.name.clone(), region);
    }

    pub fn with_region(mut self, region: AtlasRegion) -> Self {
        self.insert(region);
        self
    }

    #[inline]
    pub fn region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_registers_pages_once() {
        let atlas = TextureAtlas::new()
            .with_region(AtlasRegion::new("a", "page0.png"))
            .with_region(AtlasRegion::new("b", "page0.png"))
            .with_region(AtlasRegion::new("c", "page1.png"));
        assert_eq!(atlas.pages(), ["page0.png", "page1.png"]);
        assert_eq!(atlas.len(), 3);
        assert!(atlas.contains("b"));
        assert!(atlas.region("missing").is_none());
    }

    #[test]
    fn deserializes_from_json_document() {
        let atlas: TextureAtlas = serde_json::from_str(
            r#"{"pages": ["hero.png"],
                "regions": [{"name": "head", "page": "hero.png", "x": 2, "y": 4, "width": 32, "height": 30}]}"#,
        )
        .unwrap();
        let head = atlas.region("head").expect("head region");
        assert_eq!((head.x, head.y, head.width, head.height), (2, 4, 32, 30));
        assert!(!head.rotated);
    }
}
