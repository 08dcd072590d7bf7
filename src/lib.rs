//! SDF Flux - Symbolic dynamic filtering features for mobile-health time series
//!
//! Flux turns continuous sensor series into Markov-chain features through a
//! deterministic pipeline: maximum entropy partitioning → symbol encoding →
//! transition counting → feature assembly.
//!
//! ## Modules
//!
//! - **Partition**: fit equal-frequency cut points on pooled training data
//! - **Symbols**: quantize each series into 1-based symbols
//! - **Markov**: stationary vector and morph matrix per symbol sequence
//! - **Features**: column-wise extraction into a feature matrix

pub mod config;
pub mod error;
pub mod features;
pub mod markov;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod symbols;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::SdfConfig;
pub use error::SdfError;
pub use features::FeatureExtractor;
pub use markov::{MarkovEstimator, MarkovModel, MorphMatrix};
pub use partition::{Partition, PartitionGenerator};
pub use pipeline::{sdf_features, SdfProcessor};
pub use report::{feature_names, ReportEncoder};
pub use symbols::SymbolEncoder;
pub use types::{
    ColumnFeatures, ColumnStatus, FeatureMatrix, FeatureMode, FeatureReport, MorphLayout,
    SampleMatrix,
};

/// Library version embedded in all reports
pub const SDF_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "sdf-flux";
