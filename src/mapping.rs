use std::collections::HashMap;
use std::path::Path;

use walkdir::WalkDir;

use crate::audio::AudioLoader;
use crate::error::Result;
use crate::models::RecordingId;

/// `recording_id -> category` lookup, per §3/§6.
///
/// Opaque to the matching core — consulted only when formatting a verdict.
/// Loaded once at startup and treated as read-only thereafter (§5).
#[derive(Debug, Clone, Default)]
pub struct ScamCategoryMap {
    categories: HashMap<RecordingId, String>,
}

impl ScamCategoryMap {
    /// Loads `{ filename: category_name }` from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let categories: HashMap<RecordingId, String> = serde_json::from_str(&contents)?;
        Ok(ScamCategoryMap { categories })
    }

    /// Regenerates the mapping by walking the corpus directory and taking
    /// each file's immediate parent folder name as its category — the
    /// fallback described in §6 for when no mapping file is present.
    pub fn from_corpus_walk(corpus_root: &Path) -> Self {
        let mut categories = HashMap::new();
        for entry in WalkDir::new(corpus_root)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if !AudioLoader::has_supported_extension(entry.path()) {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            let category = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .unwrap_or("Unknown")
                .to_string();
            categories.insert(file_name.to_string(), category);
        }
        ScamCategoryMap { categories }
    }

    pub fn category_of(&self, recording_id: &str) -> String {
        self.categories
            .get(recording_id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
