use crate::dns::Name;
use crate::iterator::zone_cut::ZoneCut;
use std::net::IpAddr;

/// Supplies the starting [`ZoneCut`] a resolution begins from, letting
/// tests substitute a small synthetic hierarchy for the real root.
pub trait RootHints {
    fn initial_zone_cut(&self) -> ZoneCut;
}

/// The 13 IANA root server letters, each with one IPv4 address (RFC 1034
/// §5.3.3's "root hints"). A [`ZoneCut`] only tracks a single `ns_name`,
/// so these are folded into one synthetic nameserver name carrying the
/// union of all 13 addresses — the iterator picks among them the same way
/// it would pick among several addresses harvested as glue for a single
/// real nameserver.
const ROOT_SERVERS: [[u8; 4]; 13] = [
    [198, 41, 0, 4],
    [199, 9, 14, 201],
    [192, 33, 4, 12],
    [199, 7, 91, 13],
    [192, 203, 230, 10],
    [192, 5, 5, 241],
    [192, 112, 36, 4],
    [198, 97, 190, 53],
    [192, 36, 148, 17],
    [192, 58, 128, 30],
    [193, 0, 14, 129],
    [199, 7, 83, 42],
    [202, 12, 27, 33],
];

const ROOT_HINTS_NS_NAME: &str = "root-servers.net.";

/// Default [`RootHints`], hard-coding the real root server addresses.
pub struct StaticRootHints;

impl RootHints for StaticRootHints {
    fn initial_zone_cut(&self) -> ZoneCut {
        let root = Name::from_string(".").unwrap();
        let ns_name = Name::from_string(ROOT_HINTS_NS_NAME).unwrap();
        let mut cut = ZoneCut::new(root, ns_name);
        for addr in ROOT_SERVERS.iter() {
            cut.ns_addrs.insert(IpAddr::from(*addr));
        }
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_zone_cut_has_all_root_addrs() {
        let cut = StaticRootHints.initial_zone_cut();
        assert_eq!(cut.name, Name::from_string(".").unwrap());
        assert_eq!(cut.ns_addrs.len(), ROOT_SERVERS.len());
    }
}
