//! Overlapping subnet detection.
//!
//! A node's host subnets must be disjoint, otherwise one address could be
//! handed out twice through two allocators.

use crate::error::{IpamError, Result};
use ipnet::IpNet;
use itertools::Itertools;

/// Two subnets overlap when either one contains the other's network address.
pub fn subnets_overlap(a: &IpNet, b: &IpNet) -> bool {
    a.contains(&b.network()) || b.contains(&a.network())
}

/// Find every pair of overlapping subnets, in input order.
pub fn find_overlapping_subnets(subnets: &[IpNet]) -> Vec<(IpNet, IpNet)> {
    subnets
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| subnets_overlap(a, b))
        .map(|(a, b)| (*a, *b))
        .collect()
}

/// Return an error for the first overlapping pair.
pub fn check_for_overlapping_subnets(subnets: &[IpNet]) -> Result<()> {
    let conflicts = find_overlapping_subnets(subnets);
    for (a, b) in &conflicts {
        log::warn!("  Subnet {a} overlaps {b}");
    }
    match conflicts.first() {
        Some((a, b)) => Err(IpamError::OverlappingSubnet(*a, *b)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_subnets;

    #[test]
    fn test_subnets_overlap() {
        let s = parse_subnets(&["10.0.0.0/8", "10.0.10.0/24", "10.1.0.0/24", "2000::/64"]).unwrap();
        assert!(subnets_overlap(&s[0], &s[1]));
        assert!(subnets_overlap(&s[1], &s[0]));
        assert!(subnets_overlap(&s[0], &s[0]));
        assert!(!subnets_overlap(&s[1], &s[2]));
        assert!(!subnets_overlap(&s[0], &s[3]));
    }

    #[test]
    fn test_find_overlapping_subnets() {
        let s = parse_subnets(&["10.1.1.0/24", "2000::/64", "10.1.0.0/16", "2000::/48"]).unwrap();
        let conflicts = find_overlapping_subnets(&s);
        assert_eq!(conflicts, vec![(s[0], s[2]), (s[1], s[3])]);
    }

    #[test]
    fn test_check_for_overlapping_subnets() {
        let ok = parse_subnets(&["10.1.1.0/24", "10.1.2.0/24", "2000::/64"]).unwrap();
        assert!(check_for_overlapping_subnets(&ok).is_ok());
        assert!(check_for_overlapping_subnets(&[]).is_ok());

        let dup = parse_subnets(&["10.1.1.0/24", "10.1.1.0/24"]).unwrap();
        assert_eq!(
            check_for_overlapping_subnets(&dup).unwrap_err(),
            IpamError::OverlappingSubnet(dup[0], dup[1])
        );
    }
}
