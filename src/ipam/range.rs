//! Address allocator for a single host subnet.

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::{IpamError, Result};
use crate::models::{addr_at, broadcast_offset, last_offset, offset_of};

/// Tracks which addresses of one subnet are in use.
///
/// Offsets `0..=reserved` (the network address and the logical switch port
/// addresses) are never handed out, and neither is the IPv4 broadcast
/// address. Allocation scans upwards from the first usable offset, so a fresh
/// allocator always returns the same sequence of addresses.
// Impl Note:
// `used` only ever holds offsets inside the usable range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAllocator {
    subnet: IpNet,
    reserved: u128,
    used: BTreeSet<u128>,
}

impl RangeAllocator {
    /// Create an allocator for `subnet` with `reserved` addresses after the
    /// network address kept out of allocation.
    pub fn new(subnet: IpNet, reserved: u128) -> Self {
        Self {
            subnet,
            reserved,
            used: BTreeSet::new(),
        }
    }

    pub fn subnet(&self) -> &IpNet {
        &self.subnet
    }

    pub fn reserved(&self) -> u128 {
        self.reserved
    }

    /// First and last allocatable offsets, `None` if the subnet has no room.
    fn usable_bounds(&self) -> Option<(u128, u128)> {
        let first = self.reserved.checked_add(1)?;
        let last = match broadcast_offset(&self.subnet) {
            Some(broadcast) => broadcast.checked_sub(1)?,
            None => last_offset(&self.subnet),
        };
        (first <= last).then_some((first, last))
    }

    fn usable_offset(&self, address: IpAddr) -> Result<u128> {
        let out_of_range = || IpamError::OutOfRange {
            address,
            subnet: self.subnet,
        };
        let offset = offset_of(&self.subnet, address).ok_or_else(out_of_range)?;
        match self.usable_bounds() {
            Some((first, last)) if (first..=last).contains(&offset) => Ok(offset),
            _ => Err(out_of_range()),
        }
    }

    /// Mark a specific address as used.
    pub fn reserve(&mut self, address: IpAddr) -> Result<()> {
        let offset = self.usable_offset(address)?;
        if !self.used.insert(offset) {
            return Err(IpamError::AlreadyAllocated(address));
        }
        log::debug!("{}: reserved {address}", self.subnet);
        Ok(())
    }

    /// Allocate the lowest free address of the usable range.
    pub fn allocate_next(&mut self) -> Result<IpAddr> {
        let exhausted = IpamError::SubnetExhausted(self.subnet);
        let (first, last) = self.usable_bounds().ok_or_else(|| exhausted.clone())?;

        let mut candidate = first;
        for &offset in self.used.range(first..=last) {
            if offset != candidate {
                break;
            }
            if candidate == last {
                return Err(exhausted);
            }
            candidate += 1;
        }

        self.used.insert(candidate);
        let address = addr_at(&self.subnet, candidate);
        log::debug!("{}: allocated {address}", self.subnet);
        Ok(address)
    }

    /// Free an address. Releasing an address that is not in use does nothing.
    ///
    /// Returns `true` if the address was in use.
    pub fn release(&mut self, address: IpAddr) -> bool {
        let released = offset_of(&self.subnet, address)
            .map(|offset| self.used.remove(&offset))
            .unwrap_or(false);
        if released {
            log::debug!("{}: released {address}", self.subnet);
        }
        released
    }

    /// Check if an address is currently in use.
    pub fn is_allocated(&self, address: IpAddr) -> bool {
        offset_of(&self.subnet, address)
            .map(|offset| self.used.contains(&offset))
            .unwrap_or(false)
    }

    /// Number of addresses currently in use.
    pub fn used(&self) -> usize {
        self.used.len()
    }

    /// Number of addresses that could still be allocated.
    pub fn free(&self) -> u128 {
        match self.usable_bounds() {
            // a full IPv6 /0 is the only range whose size overflows
            Some((first, last)) => (last - first)
                .saturating_add(1)
                .saturating_sub(self.used.len() as u128),
            None => 0,
        }
    }

    /// True if no free address is left.
    pub fn usable_range_exhausted(&self) -> bool {
        self.free() == 0
    }
}

impl fmt::Display for RangeAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (reserved {}, used {})",
            self.subnet,
            self.reserved,
            self.used.len()
        )
    }
}
