//! A serialized term→weight table, loaded as JSON via `serde_json` and normalized into a
//! probability distribution over declared symbols.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use pomagma_util::{PomagmaError, Result};
use serde::{Deserialize, Serialize};

/// Tolerance for the "already roughly normalized" sanity check a freshly loaded language is
/// expected to satisfy before [`Language::normalize`] forces it to sum to exactly 1.
const TOTAL_SANITY_TOLERANCE: f64 = 0.2;

/// A raw, on-disk term→weight table: every declared symbol name paired with its unnormalized
/// weight (typically an observed usage count or a hand-tuned prior).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLanguage {
    pub weights: HashMap<String, f64>,
}

/// A normalized probability distribution over symbol names: every weight is nonnegative and the
/// full table sums to 1 (or is empty).
#[derive(Debug, Clone, Default)]
pub struct Language {
    weights: HashMap<String, f64>,
}

impl Language {
    pub fn load(path: &Path) -> Result<Language> {
        let text = fs::read_to_string(path)?;
        let raw: RawLanguage = serde_json::from_str(&text)
            .map_err(|e| PomagmaError::Parse(format!("language file {}: {e}", path.display())))?;
        Language::normalize(raw)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = RawLanguage {
            weights: self.weights.clone(),
        };
        let text = serde_json::to_string_pretty(&raw)
            .map_err(|e| PomagmaError::Parse(format!("serializing language: {e}")))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Normalizes `raw` into a probability distribution. A freshly loaded
    /// table is expected to already be close to a probability distribution (total weight near 1)
    /// before this forces it to sum to exactly 1; a total far from 1 usually means the wrong file
    /// was loaded, so it is rejected rather than silently rescaled by a large factor.
    pub fn normalize(raw: RawLanguage) -> Result<Language> {
        let total: f64 = raw.weights.values().sum();
        if raw.weights.is_empty() {
            return Ok(Language {
                weights: HashMap::new(),
            });
        }
        if (total - 1.0).abs() > TOTAL_SANITY_TOLERANCE {
            return Err(PomagmaError::Parse(format!(
                "language total weight {total} is too far from 1 to be a plausible probability table"
            )));
        }
        let weights = raw
            .weights
            .into_iter()
            .map(|(name, w)| (name, w / total))
            .collect();
        Ok(Language { weights })
    }

    /// The weight of `name`, or 0 if undeclared (an undeclared symbol contributes nothing to any
    /// route probability).
    pub fn weight(&self, name: &str) -> f64 {
        self.weights.get(name).copied().unwrap_or(0.0)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn weights(&self) -> &HashMap<String, f64> {
        &self.weights
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Builds a language directly from already-normalized weights, skipping the on-disk sanity
    /// check. Used by [`crate::router::Router::refit`] and by tests.
    pub fn from_weights(weights: HashMap<String, f64>) -> Language {
        Language { weights }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_a_roughly_balanced_table() {
        let mut weights = HashMap::new();
        weights.insert("I".to_string(), 0.5);
        weights.insert("APP".to_string(), 0.5);
        let lang = Language::normalize(RawLanguage { weights }).expect("normalize");
        assert!((lang.weight("I") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_a_table_far_from_1() {
        let mut weights = HashMap::new();
        weights.insert("I".to_string(), 500.0);
        assert!(Language::normalize(RawLanguage { weights }).is_err());
    }

    #[test]
    fn undeclared_symbol_has_zero_weight() {
        let lang = Language::from_weights(HashMap::new());
        assert_eq!(lang.weight("MISSING"), 0.0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("language.json");
        let mut weights = HashMap::new();
        weights.insert("I".to_string(), 1.0);
        let lang = Language::from_weights(weights);
        lang.save(&path).expect("save");
        let loaded = Language::load(&path).expect("load");
        assert!((loaded.weight("I") - 1.0).abs() < 1e-9);
    }
}
