mod analyzer;
pub mod fetch;
pub mod probes;
pub mod scoring;

pub use analyzer::{AnalysisOutcome, Analyzer};
