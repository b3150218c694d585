//! Per-node address allocation.
//!
//! - [`range`] - free/used tracking for a single subnet
//! - [`node`] - atomic allocation across all subnets of a node

mod node;
mod range;

pub use node::NodeSubnetSet;
pub use range::RangeAllocator;
