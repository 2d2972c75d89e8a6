//! Shared skeleton and atlas documents for tests and benches, looked up by
//! name through `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    skeletons: HashMap<String, SkeletonFixture>,
    /// Atlas name to document path.
    atlases: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SkeletonFixture {
    path: String,
    #[serde(default)]
    atlas: Option<String>,
}

fn skeleton(name: &str) -> Result<&'static SkeletonFixture> {
    MANIFEST
        .skeletons
        .get(name)
        .ok_or_else(|| anyhow!("no skeleton fixture named '{name}'"))
}

/// Contents of a file under `fixtures/`.
fn fixture_text(rel: &str) -> Result<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel);
    fs::read_to_string(&path).with_context(|| format!("reading fixture {}", path.display()))
}

pub mod skeletons {
    use super::*;

    /// Raw skeleton document, ready for a loader.
    pub fn json(name: &str) -> Result<String> {
        fixture_text(&skeleton(name)?.path)
    }

    /// Name of the atlas fixture paired with a skeleton, if declared.
    pub fn atlas_name(name: &str) -> Result<Option<String>> {
        Ok(skeleton(name)?.atlas.clone())
    }
}

pub mod atlases {
    use super::*;

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = MANIFEST
            .atlases
            .get(name)
            .ok_or_else(|| anyhow!("no atlas fixture named '{name}'"))?;
        let text = fixture_text(rel)?;
        serde_json::from_str(&text).with_context(|| format!("parsing atlas fixture {rel}"))
    }
}
