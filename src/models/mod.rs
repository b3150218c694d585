//! Domain models for node subnet IPAM.
//!
//! - [`subnet`] - address/offset arithmetic inside a host subnet and the
//!   well-known logical switch port addresses

mod subnet;

// Re-export public types
pub use subnet::{
    addr_at, addr_to_bits, broadcast_offset, gateway_ip, host_bits, hybrid_overlay_ip,
    last_offset, management_port_ip, offset_of, parse_addresses, parse_subnets, validate_subnet,
    with_prefix, GATEWAY_OFFSET, HYBRID_OVERLAY_OFFSET, MANAGEMENT_PORT_OFFSET,
};
