//! Node host subnet assignment files.
//!
//! The demo binary and the tests feed the switch manager from a JSON file
//! shaped like the output of the cluster subnet allocator:
//!
//! ```json
//! { "nodes": [ { "name": "node1", "subnets": ["10.1.1.0/24", "2000::/64"] } ] }
//! ```

use crate::manager::LogicalSwitchManager;
use crate::models::parse_subnets;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

/// Host subnets assigned to one node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NodeAssignment {
    /// Node name.
    pub name: String,
    /// CIDR strings, empty for a node without host subnets.
    #[serde(default)]
    pub subnets: Vec<String>,
}

/// All node assignments read from a file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAssignments {
    pub nodes: Vec<NodeAssignment>,
}

/// Read node assignments from a JSON file.
///
/// # Arguments
/// * `file` - Path of the assignment file
///
/// # Returns
/// * `Ok(NodeAssignments)` - The parsed assignments
/// * `Err` - If the file is missing or not valid JSON
pub fn read_node_assignments(file: &str) -> Result<NodeAssignments, Box<dyn Error>> {
    if !Path::new(file).exists() {
        return Err(format!("Assignment file does not exist: {file}").into());
    }
    log::info!("Reading node assignments from: {file}");
    let json = std::fs::read_to_string(file)
        .map_err(|e| format!("Error reading assignment file {file}: {e}"))?;

    let de = &mut serde_json::Deserializer::from_str(&json);
    let assignments: NodeAssignments = serde_path_to_error::deserialize(de)
        .map_err(|e| format!("Error parsing {file} at {}: {}", e.path(), e.inner()))?;
    log::debug!("Read {} node assignments", assignments.nodes.len());
    Ok(assignments)
}

/// Add every node of `assignments` to the switch manager.
///
/// Stops at the first node whose subnets are rejected.
pub fn register_nodes(
    manager: &LogicalSwitchManager,
    assignments: &NodeAssignments,
) -> Result<usize, Box<dyn Error>> {
    for node in &assignments.nodes {
        let subnets = parse_subnets(&node.subnets)
            .map_err(|e| format!("Node {}: {e}", node.name))?;
        manager
            .add_node(&node.name, &subnets)
            .map_err(|e| format!("Node {}: {e}", node.name))?;
    }
    Ok(assignments.nodes.len())
}
