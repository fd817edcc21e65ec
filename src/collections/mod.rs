//! Collections of domain models
//!
//! This module holds the aggregates that own many patients at once.

pub mod population;

pub use population::{AttachReport, Population};
