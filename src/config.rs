//! Configuration for SDF feature extraction.

use crate::error::SdfError;
use crate::types::{FeatureMode, MorphLayout};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default alphabet size
pub const DEFAULT_NUM_SYMBOLS: usize = 4;

/// Extraction settings shared by every stage of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdfConfig {
    /// Alphabet size (number of partition cells)
    pub num_symbols: usize,

    /// Which feature vector to emit per series
    pub mode: FeatureMode,

    /// Flatten order for morph-matrix features
    pub morph_layout: MorphLayout,

    /// Process columns on the rayon pool when the `parallel` feature is on
    pub parallel: bool,
}

impl Default for SdfConfig {
    fn default() -> Self {
        Self {
            num_symbols: DEFAULT_NUM_SYMBOLS,
            mode: FeatureMode::Stationary,
            morph_layout: MorphLayout::RowMajor,
            parallel: true,
        }
    }
}

impl SdfConfig {
    /// Config with a given alphabet size and mode, defaults elsewhere
    pub fn new(num_symbols: usize, mode: FeatureMode) -> Self {
        Self {
            num_symbols,
            mode,
            ..Self::default()
        }
    }

    pub fn with_morph_layout(mut self, layout: MorphLayout) -> Self {
        self.morph_layout = layout;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject settings no run can use
    pub fn validate(&self) -> Result<(), SdfError> {
        if self.num_symbols < 2 {
            return Err(SdfError::InvalidSymbolCount(self.num_symbols));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, SdfError> {
        let config: SdfConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SdfError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self, SdfError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SdfError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }
}
