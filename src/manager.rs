//! Logical switch manager: the node name to host subnet registry.
//!
//! Every node gets a [`NodeSubnetSet`] when it is added. Re-adding a node
//! replaces its set and drops every allocation made on the old one.
//!
//! Locking: the registry map sits behind a [`RwLock`] and each node's set
//! behind its own [`Mutex`]. Allocation and release take the map read lock
//! plus the node lock, so different nodes proceed in parallel while calls on
//! one node are serialised. Adding or deleting a node takes the map write
//! lock and therefore waits for in-flight calls on every node.

use std::collections::HashMap;

use ipnet::IpNet;
use parking_lot::{Mutex, RwLock};

use crate::config::{global_config, SharedConfig};
use crate::error::{IpamError, Result};
use crate::ipam::NodeSubnetSet;
use crate::models::validate_subnet;
use crate::processing::check_for_overlapping_subnets;

pub struct LogicalSwitchManager {
    nodes: RwLock<HashMap<String, Mutex<NodeSubnetSet>>>,
    config: SharedConfig,
}

impl Default for LogicalSwitchManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LogicalSwitchManager {
    /// Create a manager that reads the process-wide configuration.
    pub fn new() -> Self {
        Self::with_config(global_config())
    }

    /// Create a manager that reads `config` instead of the global configuration.
    pub fn with_config(config: SharedConfig) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register `node_name` with its host subnets, replacing any previous entry.
    ///
    /// The number of reserved addresses per subnet is taken from the
    /// configuration now and never re-read for this node. An empty subnet
    /// list registers a node without host subnets.
    pub fn add_node(&self, node_name: &str, subnets: &[IpNet]) -> Result<()> {
        for subnet in subnets {
            validate_subnet(subnet)?;
        }
        check_for_overlapping_subnets(subnets)?;

        let reserved = self.config.read().reserved_ips();
        let set = NodeSubnetSet::new(node_name, subnets, reserved);

        let mut nodes = self.nodes.write();
        match nodes.insert(node_name.to_string(), Mutex::new(set)) {
            Some(old) => {
                let old = old.into_inner();
                if old.used() > 0 {
                    log::warn!(
                        "Node {node_name}: replacing subnets {:?}, dropping {} allocated addresses",
                        old.subnets(),
                        old.used()
                    );
                }
                log::info!("Node {node_name}: updated host subnets to {subnets:?}");
            }
            None => log::info!("Node {node_name}: added with host subnets {subnets:?}"),
        }
        Ok(())
    }

    /// Remove a node. Returns `true` if it was registered.
    pub fn delete_node(&self, node_name: &str) -> bool {
        let removed = self.nodes.write().remove(node_name).is_some();
        if removed {
            log::info!("Node {node_name}: deleted");
        }
        removed
    }

    fn with_node<T>(&self, node_name: &str, f: impl FnOnce(&mut NodeSubnetSet) -> T) -> Result<T> {
        let nodes = self.nodes.read();
        let set = nodes
            .get(node_name)
            .ok_or_else(|| IpamError::UnknownNode(node_name.to_string()))?;
        let mut set = set.lock();
        Ok(f(&mut set))
    }

    /// Allocate the next free address in every host subnet of the node.
    ///
    /// All or nothing: on error no address stays allocated.
    pub fn allocate_next_ips(&self, node_name: &str) -> Result<Vec<IpNet>> {
        self.with_node(node_name, |set| set.allocate_next())?
    }

    /// Mark specific addresses, one per host subnet in subnet order, as allocated.
    pub fn allocate_ips(&self, node_name: &str, addresses: &[IpNet]) -> Result<()> {
        self.with_node(node_name, |set| set.allocate_specific(addresses))?
    }

    /// Return addresses to the node's host subnets.
    pub fn release_ips(&self, node_name: &str, addresses: &[IpNet]) -> Result<()> {
        self.with_node(node_name, |set| set.release(addresses))
    }

    /// True if the node is registered without host subnets.
    ///
    /// Unknown nodes are not non-host-subnet switches and return `false`.
    pub fn is_non_host_subnet_switch(&self, node_name: &str) -> bool {
        self.with_node(node_name, |set| set.is_empty())
            .unwrap_or_else(|e| {
                log::debug!("{e}");
                false
            })
    }

    /// The node's host subnets in assignment order.
    pub fn get_switch_subnets(&self, node_name: &str) -> Result<Vec<IpNet>> {
        self.with_node(node_name, |set| set.subnets())
    }

    /// Gateway, management port and hybrid overlay addresses of the node's
    /// host subnets. These are never handed out by the allocators.
    pub fn get_port_ips(&self, node_name: &str) -> Result<Vec<IpNet>> {
        self.with_node(node_name, |set| set.port_ips())
    }

    /// Names of all registered nodes, sorted.
    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of addresses in use on the node.
    pub fn used_ips(&self, node_name: &str) -> Result<usize> {
        self.with_node(node_name, |set| set.used())
    }
}
