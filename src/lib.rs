// cargo watch -x 'fmt' -x 'test'

//! Per-node host subnet IP address management for a logical switch manager.
//!
//! Every cluster node owns one or more host subnets. Pod addresses are carved
//! from those subnets through the [`LogicalSwitchManager`], which allocates
//! one address per subnet for each request and never leaves a node's subnets
//! partially allocated.

pub mod assignments;
pub mod config;
pub mod error;
pub mod ipam;
pub mod manager;
pub mod models;
pub mod output;
pub mod processing;

pub use error::{IpamError, Result};
pub use manager::LogicalSwitchManager;

use output::AllocationRow;

/// Run `rounds` allocations on every registered node and collect the results.
///
/// Nodes are visited in name order; a failed round is recorded and the next
/// node continues.
pub fn allocate_rounds(manager: &LogicalSwitchManager, rounds: usize) -> Vec<AllocationRow> {
    let mut rows = Vec::new();
    for node in manager.node_names() {
        for round in 1..=rounds {
            let result = manager.allocate_next_ips(&node);
            if let Err(e) = &result {
                log::warn!("Node {node}: allocation {round} failed: {e}");
            }
            rows.push(AllocationRow {
                node: node.clone(),
                round,
                result,
            });
        }
    }
    rows
}
