//! Static HTML reports for training and evaluation runs.

pub mod builder;
pub mod training;

pub use builder::{Report, ReportSection};
pub use training::training_report;
