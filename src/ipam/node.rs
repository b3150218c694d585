//! All host subnets of one node, allocated as a unit.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::{IpamError, Result};
use crate::ipam::RangeAllocator;
use crate::models::{
    gateway_ip, hybrid_overlay_ip, management_port_ip, with_prefix, HYBRID_OVERLAY_OFFSET,
};

/// One [`RangeAllocator`] per host subnet of a node, in the order the subnets
/// were assigned.
///
/// Multi-subnet operations either succeed on every subnet or leave the set
/// exactly as it was. The subnet list cannot change; a node whose subnets
/// change gets a new set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSubnetSet {
    node_name: String,
    allocators: Vec<RangeAllocator>,
}

impl NodeSubnetSet {
    /// Create the set with `reserved` addresses kept out of every subnet.
    pub fn new(node_name: &str, subnets: &[IpNet], reserved: u128) -> Self {
        Self {
            node_name: node_name.to_string(),
            allocators: subnets
                .iter()
                .map(|subnet| RangeAllocator::new(*subnet, reserved))
                .collect(),
        }
    }

    /// The node's subnets in assignment order.
    pub fn subnets(&self) -> Vec<IpNet> {
        self.allocators.iter().map(|a| *a.subnet()).collect()
    }

    /// True for a node without host subnets.
    pub fn is_empty(&self) -> bool {
        self.allocators.is_empty()
    }

    /// Total number of addresses in use across all subnets.
    pub fn used(&self) -> usize {
        self.allocators.iter().map(RangeAllocator::used).sum()
    }

    /// Logical switch port addresses kept out of every subnet, in subnet order:
    /// gateway, management port and, when reserved, the hybrid overlay gateway.
    pub fn port_ips(&self) -> Vec<IpNet> {
        let mut ports = Vec::new();
        for allocator in &self.allocators {
            let subnet = allocator.subnet();
            ports.extend(gateway_ip(subnet));
            ports.extend(management_port_ip(subnet));
            if allocator.reserved() >= HYBRID_OVERLAY_OFFSET {
                ports.extend(hybrid_overlay_ip(subnet));
            }
        }
        ports
    }

    /// Subnets that have no free address left.
    pub fn exhausted_subnets(&self) -> Vec<IpNet> {
        self.allocators
            .iter()
            .filter(|a| a.usable_range_exhausted())
            .map(|a| *a.subnet())
            .collect()
    }

    /// Allocate the next free address of every subnet.
    ///
    /// Returns one address per subnet, in subnet order, each paired with its
    /// subnet's prefix length. If any subnet fails, the addresses taken
    /// earlier in this call are released again before the error is returned.
    pub fn allocate_next(&mut self) -> Result<Vec<IpNet>> {
        let mut allocated: Vec<IpAddr> = Vec::with_capacity(self.allocators.len());
        for idx in 0..self.allocators.len() {
            match self.allocators[idx].allocate_next() {
                Ok(address) => allocated.push(address),
                Err(e) => {
                    self.rollback(&allocated);
                    return Err(e);
                }
            }
        }
        Ok(self.pair_with_subnets(&allocated))
    }

    /// Reserve specific addresses, one per subnet in subnet order.
    ///
    /// Either every address is reserved or none is.
    pub fn allocate_specific(&mut self, addresses: &[IpNet]) -> Result<()> {
        if addresses.len() != self.allocators.len() {
            return Err(IpamError::SubnetCountMismatch {
                expected: self.allocators.len(),
                actual: addresses.len(),
            });
        }

        let mut reserved: Vec<IpAddr> = Vec::with_capacity(addresses.len());
        for (idx, address) in addresses.iter().enumerate() {
            if let Err(e) = self.allocators[idx].reserve(address.addr()) {
                self.rollback(&reserved);
                return Err(e);
            }
            reserved.push(address.addr());
        }
        Ok(())
    }

    /// Release addresses back to whichever subnet contains them.
    ///
    /// Addresses not in use, or not in any of the node's subnets, are ignored.
    pub fn release(&mut self, addresses: &[IpNet]) {
        for address in addresses {
            let addr = address.addr();
            match self
                .allocators
                .iter_mut()
                .find(|a| a.subnet().contains(&addr))
            {
                Some(allocator) => {
                    allocator.release(addr);
                }
                None => log::debug!(
                    "node {}: ignoring release of {addr}, not in any node subnet",
                    self.node_name
                ),
            }
        }
    }

    // `done[i]` belongs to `allocators[i]`, undo newest first.
    fn rollback(&mut self, done: &[IpAddr]) {
        for (idx, address) in done.iter().enumerate().rev() {
            log::debug!(
                "node {}: rolling back {address} in {}",
                self.node_name,
                self.allocators[idx].subnet()
            );
            self.allocators[idx].release(*address);
        }
    }

    fn pair_with_subnets(&self, addresses: &[IpAddr]) -> Vec<IpNet> {
        self.allocators
            .iter()
            .zip(addresses)
            .map(|(allocator, address)| with_prefix(*address, allocator.subnet()))
            .collect()
    }
}
