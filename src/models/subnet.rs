//! Host subnet address arithmetic.
//!
//! Addresses inside a subnet are handled as numeric offsets from the network
//! address, so IPv4 and IPv6 share one code path. The helpers here convert
//! between [`IpAddr`] and offsets and know where the well-known logical switch
//! ports sit in every subnet.

use crate::error::{IpamError, Result};
use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Offset of the logical router gateway port address.
pub const GATEWAY_OFFSET: u128 = 1;
/// Offset of the node management port address.
pub const MANAGEMENT_PORT_OFFSET: u128 = 2;
/// Offset of the hybrid overlay gateway port address.
pub const HYBRID_OVERLAY_OFFSET: u128 = 3;

/// Convert an address to its numeric value.
pub fn addr_to_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(v4) as u128,
        IpAddr::V6(v6) => u128::from(v6),
    }
}

/// Number of host bits in the subnet.
pub fn host_bits(subnet: &IpNet) -> u8 {
    subnet.max_prefix_len() - subnet.prefix_len()
}

/// Offset of the highest address in the subnet.
///
/// For IPv4 this is the broadcast address.
///
/// # Examples
/// ```
/// use node_subnet_ipam::models::last_offset;
/// assert_eq!(last_offset(&"10.1.1.0/24".parse().unwrap()), 255);
/// ```
pub fn last_offset(subnet: &IpNet) -> u128 {
    match host_bits(subnet) {
        0 => 0,
        bits => u128::MAX >> (128 - bits as u32),
    }
}

/// Offset of the IPv4 broadcast address, `None` for IPv6 subnets.
pub fn broadcast_offset(subnet: &IpNet) -> Option<u128> {
    match subnet {
        IpNet::V4(_) => Some(last_offset(subnet)),
        IpNet::V6(_) => None,
    }
}

/// Offset of `addr` from the network address, `None` if `addr` is not in the subnet.
pub fn offset_of(subnet: &IpNet, addr: IpAddr) -> Option<u128> {
    if !subnet.contains(&addr) {
        return None;
    }
    Some(addr_to_bits(addr) - addr_to_bits(subnet.network()))
}

/// Address at `offset` from the network address.
///
/// The offset must not exceed [`last_offset`].
pub fn addr_at(subnet: &IpNet, offset: u128) -> IpAddr {
    debug_assert!(offset <= last_offset(subnet), "offset outside {subnet}");
    let bits = addr_to_bits(subnet.network()) + offset;
    match subnet {
        IpNet::V4(_) => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        IpNet::V6(_) => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

/// Pair an address with the prefix length of its subnet.
pub fn with_prefix(addr: IpAddr, subnet: &IpNet) -> IpNet {
    IpNet::new(addr, subnet.prefix_len()).expect("prefix length taken from a valid subnet")
}

fn port_addr(subnet: &IpNet, offset: u128) -> Option<IpNet> {
    if offset > last_offset(subnet) {
        return None;
    }
    Some(with_prefix(addr_at(subnet, offset), subnet))
}

/// Address of the logical router gateway port, e.g. `10.1.1.1/24`.
pub fn gateway_ip(subnet: &IpNet) -> Option<IpNet> {
    port_addr(subnet, GATEWAY_OFFSET)
}

/// Address of the node management port, e.g. `10.1.1.2/24`.
pub fn management_port_ip(subnet: &IpNet) -> Option<IpNet> {
    port_addr(subnet, MANAGEMENT_PORT_OFFSET)
}

/// Address of the hybrid overlay gateway port, e.g. `10.1.1.3/24`.
pub fn hybrid_overlay_ip(subnet: &IpNet) -> Option<IpNet> {
    port_addr(subnet, HYBRID_OVERLAY_OFFSET)
}

/// Check that a subnet is a network address, not a host address with a prefix.
pub fn validate_subnet(subnet: &IpNet) -> Result<()> {
    if subnet.trunc() != *subnet {
        return Err(IpamError::MalformedSubnet(format!(
            "{subnet} has host bits set, expected {}",
            subnet.trunc()
        )));
    }
    Ok(())
}

/// Parse CIDR strings such as `"10.1.1.0/24"` into subnets.
pub fn parse_subnets<S: AsRef<str>>(cidrs: &[S]) -> Result<Vec<IpNet>> {
    cidrs
        .iter()
        .map(|cidr| {
            let cidr = cidr.as_ref().trim();
            let subnet: IpNet = cidr
                .parse()
                .map_err(|_| IpamError::MalformedSubnet(format!("invalid CIDR {cidr}")))?;
            validate_subnet(&subnet)?;
            Ok(subnet)
        })
        .collect()
}

/// Parse address/prefix strings such as `"10.1.1.3/24"`, host bits allowed.
pub fn parse_addresses<S: AsRef<str>>(cidrs: &[S]) -> Result<Vec<IpNet>> {
    cidrs
        .iter()
        .map(|cidr| {
            let cidr = cidr.as_ref().trim();
            cidr.parse()
                .map_err(|_| IpamError::MalformedSubnet(format!("invalid address {cidr}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    #[test]
    fn test_last_offset() {
        assert_eq!(last_offset(&net("10.1.1.0/24")), 255);
        assert_eq!(last_offset(&net("10.1.2.0/29")), 7);
        assert_eq!(last_offset(&net("10.1.2.1/32")), 0);
        assert_eq!(last_offset(&net("0.0.0.0/0")), u32::MAX as u128);
        assert_eq!(last_offset(&net("2000::/64")), u64::MAX as u128);
        assert_eq!(last_offset(&net("::/0")), u128::MAX);
    }

    #[test]
    fn test_broadcast_offset() {
        assert_eq!(broadcast_offset(&net("10.1.2.0/29")), Some(7));
        assert_eq!(broadcast_offset(&net("2000::/120")), None);
    }

    #[test]
    fn test_offset_of() {
        let subnet = net("10.1.1.0/24");
        assert_eq!(offset_of(&subnet, "10.1.1.3".parse().unwrap()), Some(3));
        assert_eq!(offset_of(&subnet, "10.1.1.255".parse().unwrap()), Some(255));
        assert_eq!(offset_of(&subnet, "10.1.2.0".parse().unwrap()), None);
        assert_eq!(offset_of(&subnet, "2000::3".parse().unwrap()), None);

        let subnet = net("2000::/64");
        assert_eq!(offset_of(&subnet, "2000::ff".parse().unwrap()), Some(255));
    }

    #[test]
    fn test_addr_at() {
        assert_eq!(
            addr_at(&net("10.1.1.0/24"), 4),
            "10.1.1.4".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            addr_at(&net("2000::/64"), 0x10),
            "2000::10".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_port_addresses() {
        let subnet = net("10.1.1.0/24");
        assert_eq!(gateway_ip(&subnet), Some(net("10.1.1.1/24")));
        assert_eq!(management_port_ip(&subnet), Some(net("10.1.1.2/24")));
        assert_eq!(hybrid_overlay_ip(&subnet), Some(net("10.1.1.3/24")));

        let subnet = net("2000::/64");
        assert_eq!(gateway_ip(&subnet), Some(net("2000::1/64")));

        assert_eq!(management_port_ip(&net("10.1.1.0/31")), None);
    }

    #[test]
    fn test_parse_subnets() {
        let subnets = parse_subnets(&["10.1.1.0/24", " 2000::/64"]).unwrap();
        assert_eq!(subnets, vec![net("10.1.1.0/24"), net("2000::/64")]);

        assert!(matches!(
            parse_subnets(&["10.1.1.0"]),
            Err(IpamError::MalformedSubnet(_))
        ));
        assert!(matches!(
            parse_subnets(&["10.1.1.0/33"]),
            Err(IpamError::MalformedSubnet(_))
        ));
        assert!(matches!(
            parse_subnets(&["10.1.1.5/24"]),
            Err(IpamError::MalformedSubnet(_))
        ));
        assert!(parse_subnets::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_addresses() {
        let addrs = parse_addresses(&["10.1.1.2/24", "2000::2/64"]).unwrap();
        assert_eq!(addrs[0].addr(), "10.1.1.2".parse::<IpAddr>().unwrap());
        assert_eq!(addrs[1].prefix_len(), 64);
    }
}
