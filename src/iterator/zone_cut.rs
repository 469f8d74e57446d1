use crate::dns::{Name, Record};
use crate::iterator::name_utils;
use std::collections::BTreeSet;
use std::net::IpAddr;

/// Tracks the current delegation point the iterator is querying: the zone
/// apex (`name`), the nameserver chosen to answer for it (`ns_name`), and
/// whatever addresses have been harvested for that nameserver so far.
///
/// A [`ZoneCut`] only ever names a single nameserver at a time — when a
/// referral is taken, [`ZoneCut::set_name`] drops whatever addresses were
/// known for the previous nameserver, since they say nothing about the new
/// one.
#[derive(Debug, Clone)]
pub struct ZoneCut {
    pub name: Name,
    pub ns_name: Name,
    pub ns_addrs: BTreeSet<IpAddr>,
}

impl ZoneCut {
    pub fn new(name: Name, ns_name: Name) -> Self {
        ZoneCut { name, ns_name, ns_addrs: BTreeSet::new() }
    }

    /// Moves the cut down to a new delegation point, discarding any
    /// addresses harvested for the nameserver of the previous cut.
    pub fn set_name(&mut self, new_name: Name, new_ns_name: Name) {
        self.name = new_name;
        self.ns_name = new_ns_name;
        self.ns_addrs.clear();
    }

    /// Accepts `rr` as glue for the current nameserver iff it's an A/AAAA
    /// record whose owner matches `ns_name` exactly (case-insensitive). Any
    /// other record is silently ignored.
    pub fn set_ns_addr(&mut self, rr: &Record) {
        let addr = match rr {
            Record::A { node, address, .. } if name_utils::equal(node, &self.ns_name) => IpAddr::from(*address),
            Record::AAAA { node, address, .. } if name_utils::equal(node, &self.ns_name) => IpAddr::from(*address),
            _ => return,
        };
        self.ns_addrs.insert(addr);
    }

    pub fn has_glue(&self) -> bool {
        !self.ns_addrs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::Class;

    fn name(s: &str) -> Name {
        Name::from_string(s).unwrap()
    }

    #[test]
    fn test_set_ns_addr_accepts_matching_owner() {
        let mut cut = ZoneCut::new(name("example.com."), name("ns1.example.com."));
        let a = Record::A {
            node: name("ns1.example.com."),
            class: Class::IN,
            ttl: 300,
            data_len: 4,
            address: [192, 0, 2, 1],
        };
        cut.set_ns_addr(&a);
        assert!(cut.has_glue());
        assert_eq!(cut.ns_addrs.len(), 1);
    }

    #[test]
    fn test_set_ns_addr_rejects_mismatched_owner() {
        let mut cut = ZoneCut::new(name("example.com."), name("ns1.example.com."));
        let a = Record::A {
            node: name("evil.attacker.net."),
            class: Class::IN,
            ttl: 300,
            data_len: 4,
            address: [192, 0, 2, 1],
        };
        cut.set_ns_addr(&a);
        assert!(!cut.has_glue());
    }

    #[test]
    fn test_set_name_clears_addrs() {
        let mut cut = ZoneCut::new(name("example.com."), name("ns1.example.com."));
        cut.set_ns_addr(&Record::A {
            node: name("ns1.example.com."),
            class: Class::IN,
            ttl: 300,
            data_len: 4,
            address: [192, 0, 2, 1],
        });
        assert!(cut.has_glue());
        cut.set_name(name("sub.example.com."), name("ns1.sub.example.com."));
        assert!(!cut.has_glue());
    }
}
