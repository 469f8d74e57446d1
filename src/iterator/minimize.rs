use crate::dns::{Name, RecordType};
use crate::iterator::name_utils;
use crate::iterator::plan::Query;

/// Computes the QNAME and QTYPE to actually put on the wire for `query`,
/// applying QNAME minimization (RFC 7816) unless the query has already
/// opted out via `flags.no_minimize`.
///
/// The minimized name keeps only `labels(zone_cut.name) + 1` labels of
/// `sname`, i.e. one label deeper than the current zone cut. If that name
/// differs from `sname` the query type is forced to NS — the iterator
/// isn't asking for `sname`'s real data yet, only for the next delegation.
pub fn minimize(query: &Query) -> (Name, RecordType) {
    if query.flags.no_minimize {
        return (query.sname.clone(), query.stype);
    }

    let k = name_utils::label_count(&query.zone_cut.name) + 1;
    let minimized = name_utils::last_k_labels(&query.sname, k);

    if name_utils::equal(&minimized, &query.sname) {
        (minimized, query.stype)
    } else {
        (minimized, RecordType::NS)
    }
}
