//! Export and reconciliation engine
//!
//! 1. Exporting - Allocate stable names and write one document per resource
//! 2. Diffing - Compare declared documents against observed ones

pub mod differ;
pub mod exporter;

pub use differ::{DiffSummary, compute_diffs, display_diff};
pub use exporter::{Exporter, load_resources};
