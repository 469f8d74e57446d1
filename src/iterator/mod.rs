//! The recursive DNS iterator: a state machine implementing the
//! algorithm of RFC 1034 §5.3.3 steps a-d, layered with QNAME
//! minimization (RFC 7816) and EDNS(0) (RFC 6891).

mod answer;
mod classify;
mod config;
mod driver;
mod errors;
mod minimize;
mod name_utils;
mod plan;
mod process;
mod random;
mod roothints;
mod trace;
mod zone_cut;

pub use answer::{AnswerBuilder, MessageAnswerBuilder, SectionHint};
pub use classify::{classify, Classification};
pub use config::IteratorConfig;
pub use driver::{BeginParams, Layer, State};
pub use errors::IterError;
pub use plan::{PlanDisorder, Query, QueryFlags, QueryId, ResolutionPlan};
pub use random::{Random, SystemRandom};
pub use roothints::{RootHints, StaticRootHints};
pub use trace::{Trace, TraceParams};
pub use zone_cut::ZoneCut;
