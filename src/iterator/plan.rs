use crate::dns::{Class, Name, RecordType};
use crate::iterator::zone_cut::ZoneCut;

/// Index of a [`Query`] inside a [`ResolutionPlan`]. Indices are stable for
/// the lifetime of an entry (entries are only ever removed from the top),
/// so a parent index always keeps pointing at its ancestor.
pub type QueryId = usize;

/// Per-query behavioral flags, set by the processing stage in reaction to
/// a previous response and read back by [`crate::iterator::minimize`] and
/// [`crate::iterator::driver`] on the next attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryFlags {
    /// Set after a minimized query returned NODATA/NXDOMAIN: the retry
    /// must ask the full QNAME instead.
    pub no_minimize: bool,
    /// Set after a UDP response came back with TC=1: the retry must use TCP.
    pub tcp: bool,
}

/// A single outstanding question plus the zone cut it's being resolved
/// against and a backward link to the query that spawned it (if any).
#[derive(Debug, Clone)]
pub struct Query {
    pub sname: Name,
    pub sclass: Class,
    pub stype: RecordType,
    /// The id of the last outbound attempt; assigned by `prepare_query`.
    pub id: u16,
    pub flags: QueryFlags,
    pub parent: Option<QueryId>,
    pub zone_cut: ZoneCut,
}

/// Failure to maintain the plan's LIFO discipline: a caller tried to pop
/// an entry that wasn't on top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanDisorder;

/// A LIFO stack of in-flight queries. The bottom entry is always the
/// original question passed to [`crate::iterator::driver::Layer::begin`];
/// every other entry was pushed to resolve some dependency of an entry
/// below it (a CNAME target, a missing nameserver address) and carries a
/// `parent` index pointing at that entry.
#[derive(Debug, Default)]
pub struct ResolutionPlan {
    queries: Vec<Query>,
}

impl ResolutionPlan {
    pub fn new() -> Self {
        ResolutionPlan { queries: Vec::new() }
    }

    /// Pushes a new sub-query onto the plan. The new entry inherits the
    /// zone cut of `parent` when given, otherwise it starts from
    /// `root_cut` (normally obtained from a [`crate::iterator::roothints::RootHints`]
    /// collaborator). Returns the id of the pushed entry.
    pub fn push(&mut self, parent: Option<QueryId>, sname: Name, sclass: Class, stype: RecordType, root_cut: &ZoneCut) -> QueryId {
        let zone_cut = match parent {
            Some(p) => self.queries[p].zone_cut.clone(),
            None => root_cut.clone(),
        };
        self.queries.push(Query {
            sname,
            sclass,
            stype,
            id: 0,
            flags: QueryFlags::default(),
            parent,
            zone_cut,
        });
        self.queries.len() - 1
    }

    /// Removes the topmost entry, which must be `q`. Fails with
    /// [`PlanDisorder`] (without mutating the plan) if `q` isn't on top.
    pub fn pop(&mut self, q: QueryId) -> Result<Query, PlanDisorder> {
        if self.queries.len().wrapping_sub(1) != q {
            return Err(PlanDisorder);
        }
        Ok(self.queries.pop().unwrap())
    }

    pub fn current(&self) -> Option<&Query> {
        self.queries.last()
    }

    pub fn current_id(&self) -> Option<QueryId> {
        if self.queries.is_empty() {
            None
        } else {
            Some(self.queries.len() - 1)
        }
    }

    pub fn get(&self, q: QueryId) -> Option<&Query> {
        self.queries.get(q)
    }

    pub fn get_mut(&mut self, q: QueryId) -> Option<&mut Query> {
        self.queries.get_mut(q)
    }

    pub fn empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.queries.len()
    }
}
