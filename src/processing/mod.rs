//! Subnet validation applied before a node is registered.
//!
//! - [`overlap`] - detection of overlapping host subnets

mod overlap;

// Re-export public functions
pub use overlap::{check_for_overlapping_subnets, find_overlapping_subnets, subnets_overlap};
