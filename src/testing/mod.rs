//! Testability harness utilities.
//!
//! Synthetic recordings generated here feed unit tests, the integration
//! suite and the `synthesize` CLI command, so the pipeline can be exercised
//! without real sensor exports.

pub mod synthetic;

pub use synthetic::{write_csv, AxisTone, SyntheticSpec, GRAVITY};
