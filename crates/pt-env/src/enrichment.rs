//! Per-activity bottleneck scores and embeddings for the enriched variant.
//!
//! Both tables are produced elsewhere (process mining, a graph model) and
//! handed over as JSON:
//!
//! ```json
//! { "bottlenecks": [ { "activity": "Record Invoice Receipt", "bottleneck_score": 0.83 } ] }
//! ```
//!
//! ```json
//! { "Record Invoice Receipt": [0.12, -0.40, 0.95] }
//! ```
//!
//! Activities missing from a table score 0 and have an empty embedding.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::EnvResult;

#[derive(Deserialize)]
struct BottleneckReport {
    #[serde(default)]
    bottlenecks: Vec<BottleneckEntry>,
}

#[derive(Deserialize)]
struct BottleneckEntry {
    activity:         String,
    #[serde(default)]
    bottleneck_score: f32,
}

/// Lookup tables keyed by activity name.
#[derive(Clone, Debug, Default)]
pub struct Enrichment {
    scores:     FxHashMap<String, f32>,
    embeddings: FxHashMap<String, Vec<f32>>,
}

impl Enrichment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, activity: &str, score: f32) -> Self {
        self.scores.insert(activity.to_owned(), score);
        self
    }

    pub fn with_embedding(mut self, activity: &str, embedding: Vec<f32>) -> Self {
        self.embeddings.insert(activity.to_owned(), embedding);
        self
    }

    /// Merge scores from a bottleneck report.  Later entries for the same
    /// activity win.
    pub fn load_bottleneck_json(&mut self, json: &str) -> EnvResult<usize> {
        let report: BottleneckReport = serde_json::from_str(json)?;
        let n = report.bottlenecks.len();
        for b in report.bottlenecks {
            self.scores.insert(b.activity, b.bottleneck_score);
        }
        Ok(n)
    }

    /// Merge an `activity → vector` embedding map.
    pub fn load_embedding_json(&mut self, json: &str) -> EnvResult<usize> {
        let map: FxHashMap<String, Vec<f32>> = serde_json::from_str(json)?;
        let n = map.len();
        self.embeddings.extend(map);
        Ok(n)
    }

    /// Read either file, skipping (with a warning) any that fails.  The
    /// enriched variant then falls back to zero features for what is missing.
    pub fn load_lenient(bottlenecks: Option<&Path>, embeddings: Option<&Path>) -> Self {
        let mut enrichment = Self::new();
        if let Some(path) = bottlenecks {
            match std::fs::read_to_string(path)
                .map_err(Into::into)
                .and_then(|s| enrichment.load_bottleneck_json(&s))
            {
                Ok(n) => log::info!("loaded {n} bottleneck scores from {}", path.display()),
                Err(e) => log::warn!("ignoring bottleneck report {}: {e}", path.display()),
            }
        }
        if let Some(path) = embeddings {
            match std::fs::read_to_string(path)
                .map_err(Into::into)
                .and_then(|s| enrichment.load_embedding_json(&s))
            {
                Ok(n) => log::info!("loaded {n} activity embeddings from {}", path.display()),
                Err(e) => log::warn!("ignoring embeddings {}: {e}", path.display()),
            }
        }
        enrichment
    }

    pub fn score(&self, activity: &str) -> f32 {
        self.scores.get(activity).copied().unwrap_or(0.0)
    }

    pub fn embedding(&self, activity: &str) -> &[f32] {
        self.embeddings.get(activity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn score_count(&self) -> usize {
        self.scores.len()
    }

    pub fn embedding_count(&self) -> usize {
        self.embeddings.len()
    }
}

/// Summary statistics of an embedding vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmbeddingStats {
    pub mean: f32,
    /// Population standard deviation.
    pub std:  f32,
    pub max:  f32,
}

impl EmbeddingStats {
    /// All zero for an empty vector.
    pub fn of(v: &[f32]) -> Self {
        if v.is_empty() {
            return Self::default();
        }
        let n = v.len() as f32;
        let mean = v.iter().sum::<f32>() / n;
        let var = v.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
        let max = v.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Self { mean, std: var.sqrt(), max }
    }

    /// Every component clamped to `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            mean: self.mean.clamp(0.0, 1.0),
            std:  self.std.clamp(0.0, 1.0),
            max:  self.max.clamp(0.0, 1.0),
        }
    }
}
