//! Errors returned by the subnet IPAM.

use ipnet::IpNet;
use std::net::IpAddr;
use thiserror::Error;

/// Result type used throughout the IPAM modules.
pub type Result<T> = std::result::Result<T, IpamError>;

/// IP address management errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpamError {
    /// The node was never added to the switch manager.
    #[error("node {0} not found in the logical switch manager")]
    UnknownNode(String),
    /// A supplied subnet is not a valid network.
    #[error("malformed subnet: {0}")]
    MalformedSubnet(String),
    /// Two subnets supplied for the same node overlap.
    #[error("subnet {0} overlaps subnet {1}")]
    OverlappingSubnet(IpNet, IpNet),
    /// The address is outside the usable range of the subnet.
    #[error("address {address} is outside the usable range of {subnet}")]
    OutOfRange { address: IpAddr, subnet: IpNet },
    /// The address is already in use.
    #[error("address {0} already allocated")]
    AlreadyAllocated(IpAddr),
    /// Every usable address of the subnet is in use.
    #[error("no addresses available in subnet {0}")]
    SubnetExhausted(IpNet),
    /// The number of requested addresses does not match the node's subnets.
    #[error("expected {expected} addresses, one per node subnet, got {actual}")]
    SubnetCountMismatch { expected: usize, actual: usize },
}
