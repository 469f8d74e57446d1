use crate::dns::{Class, Header, Message, Name, Question, Record, RecordType, RespCode};
use crate::iterator::answer::{AnswerBuilder, MessageAnswerBuilder};
use crate::iterator::classify::{classify, Classification};
use crate::iterator::config::IteratorConfig;
use crate::iterator::minimize::minimize;
use crate::iterator::name_utils;
use crate::iterator::plan::{Query, QueryId, ResolutionPlan};
use crate::iterator::process::{finalize_answer, process_additional, process_answer, process_authority, AuthorityOutcome};
use crate::iterator::random::Random;
use crate::iterator::roothints::RootHints;
use crate::iterator::trace::{Trace, TraceParams};
use crate::iterator::zone_cut::ZoneCut;

/// The public state of a [`Layer`], returned by every entrypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No resolution is in progress; `begin` must be called.
    Full,
    /// An outbound packet is ready and a response is awaited.
    More,
    /// The current step concluded: either an intermediate event the
    /// caller reacts to by calling `prepare_query` again (a referral, a
    /// minimization retry, a UDP->TCP promotion) or, iff the plan has
    /// drained, the final answer is ready (see [`Layer::is_finished`]).
    Done,
    /// The layer has no attached resolution (after `finish`, or before
    /// the first `begin`).
    Noop,
    /// The resolution failed; `reset` or `finish` must be called before
    /// reuse.
    Fail,
}

/// The initial question a resolution is started for.
#[derive(Debug, Clone)]
pub struct BeginParams {
    pub qname: Name,
    pub qclass: Class,
    pub qtype: RecordType,
}

struct LayerContext {
    plan: ResolutionPlan,
    answer: Box<dyn AnswerBuilder>,
    state: State,
    root_cut: ZoneCut,
    trace: Option<Trace>,
}

/// The recursive-DNS-iterator state machine (RFC 1034 §5.3.3 steps a-d),
/// combining QNAME minimization (RFC 7816) and EDNS(0) (RFC 6891)
/// signalling. A `Layer` resolves one question end to end across
/// repeated `prepare_query`/`resolve` exchanges; the transport that
/// actually sends and receives packets lives outside this type.
pub struct Layer<R: Random, RH: RootHints> {
    config: IteratorConfig,
    random: R,
    root_hints: RH,
    trace_params: Option<TraceParams>,
    ctx: Option<LayerContext>,
}

impl<R: Random, RH: RootHints> Layer<R, RH> {
    pub fn new(config: IteratorConfig, random: R, root_hints: RH) -> Self {
        Layer { config, random, root_hints, trace_params: None, ctx: None }
    }

    /// Enables trace collection for every resolution started from now on.
    pub fn enable_trace(&mut self, params: TraceParams) {
        self.trace_params = Some(params);
    }

    /// Returns the collected trace of the current resolution, if tracing
    /// is enabled and a resolution has been started.
    pub fn trace(&self) -> Option<&Trace> {
        self.ctx.as_ref().and_then(|c| c.trace.as_ref())
    }

    /// Reports whether the current resolution has produced a final
    /// answer. Since `DONE` is also returned for intermediate events
    /// (referrals, retries), callers loop on `prepare_query`/`resolve`
    /// until both `state() == DONE` and `is_finished()`.
    pub fn is_finished(&self) -> bool {
        match &self.ctx {
            Some(ctx) => ctx.state == State::Done && ctx.plan.empty(),
            None => false,
        }
    }

    pub fn state(&self) -> State {
        self.ctx.as_ref().map(|c| c.state).unwrap_or(State::Full)
    }

    /// Starts a new resolution for `params`, discarding any previous one.
    pub fn begin(&mut self, params: BeginParams) {
        let root_cut = self.root_hints.initial_zone_cut();
        let mut plan = ResolutionPlan::new();
        plan.push(None, params.qname.clone(), params.qclass, params.qtype, &root_cut);

        let mut trace = self.trace_params.clone().map(Trace::new);
        if let Some(trace) = trace.as_mut() {
            trace.t_begin(&params.qname, params.qtype);
        }

        self.ctx = Some(LayerContext {
            plan,
            answer: Box::new(MessageAnswerBuilder::new(self.config.max_answer_size)),
            state: State::Full,
            root_cut,
            trace,
        });
    }

    /// Builds the next outbound query packet into `out`. Returns `NOOP` if
    /// no resolution is attached, the state unchanged if the plan has
    /// already drained, or `MORE` once `out` is ready to send.
    pub fn prepare_query(&mut self, out: &mut Message) -> State {
        let ctx = match &mut self.ctx {
            Some(c) => c,
            None => return State::Noop,
        };
        if ctx.state == State::Fail {
            return ctx.state;
        }

        let current_id = match ctx.plan.current_id() {
            Some(id) => id,
            None => {
                ctx.state = State::Done;
                return ctx.state;
            }
        };

        let id = self.random.u16();
        ctx.plan.get_mut(current_id).unwrap().id = id;
        let query = ctx.plan.get(current_id).unwrap().clone();
        let (qname, qtype) = minimize(&query);

        if let Some(trace) = ctx.trace.as_mut() {
            trace.t_query(&qname, qtype, &query.zone_cut.ns_name);
        }

        *out = build_query_message(id, &qname, query.sclass, qtype, &self.config);
        ctx.state = State::More;
        ctx.state
    }

    /// Feeds the raw bytes of a response back to the layer. Malformed
    /// packets, id/question mismatches (silently dropped, per RFC 5452
    /// spoofing guidance), fatal response codes, and bailiwick
    /// violations are all handled here before delegating to
    /// [`crate::iterator::process`].
    pub fn resolve(&mut self, bytes: &[u8]) -> State {
        let ctx = match &mut self.ctx {
            Some(c) => c,
            None => return State::Noop,
        };
        if matches!(ctx.state, State::Fail | State::Noop) {
            return ctx.state;
        }

        let current_id = match ctx.plan.current_id() {
            Some(id) => id,
            None => {
                ctx.state = State::Done;
                return ctx.state;
            }
        };

        let msg = match Message::decode_from_bytes(bytes) {
            Ok(m) => m,
            Err(err) => {
                log::debug!("malformed response: {:?}", err);
                if let Some(trace) = ctx.trace.as_mut() {
                    trace.t_fail("malformed response");
                }
                ctx.state = State::Fail;
                return ctx.state;
            }
        };

        let query = ctx.plan.get(current_id).unwrap().clone();
        let (expected_qname, expected_qtype) = minimize(&query);

        let question_matches = msg.questions.len() == 1
            && msg.header.id == query.id
            && query.sclass == msg.questions[0].class
            && expected_qtype == msg.questions[0].record_type
            && name_utils::equal(&expected_qname, &msg.questions[0].node);

        if !question_matches {
            log::debug!("dropping response with mismatched id/question");
            return ctx.state;
        }

        if let Some(trace) = ctx.trace.as_mut() {
            trace.t_raw_resp(&msg);
        }

        match msg.header.resp_code {
            RespCode::NoError | RespCode::NxDomain => {}
            other => {
                log::debug!("fatal response code: {:?}", other);
                if let Some(trace) = ctx.trace.as_mut() {
                    trace.t_fail("fatal response code");
                }
                ctx.state = State::Fail;
                return ctx.state;
            }
        }

        if msg.header.truncated {
            if query.flags.tcp {
                log::debug!("truncated again over tcp, giving up");
                ctx.state = State::Fail;
                return ctx.state;
            }
            ctx.plan.get_mut(current_id).unwrap().flags.tcp = true;
            if let Some(trace) = ctx.trace.as_mut() {
                trace.t_tcp_promotion(&query.sname);
            }
            ctx.state = State::Done;
            return ctx.state;
        }

        self.resolve_authoritative(current_id, &query, &msg)
    }

    /// Scans AUTHORITY for a referral first, per §4.6; only once that
    /// comes back `NoReferral` is the packet actually an authoritative
    /// answer, at which point the minimization-retry special case (an
    /// empty-non-terminal or NXDOMAIN from a minimized probe) and
    /// `process_answer` apply. A referral is NOERROR with an empty
    /// ANSWER section too, so checking minimization before the referral
    /// scan would mistake every referral for a retry case and the cut
    /// would never descend.
    fn resolve_authoritative(&mut self, current_id: QueryId, query: &Query, msg: &Message) -> State {
        let ctx = self.ctx.as_mut().unwrap();

        match process_authority(&mut ctx.plan, current_id, msg) {
            Err(err) => {
                log::debug!("authority processing failed: {:?}", err);
                if let Some(trace) = ctx.trace.as_mut() {
                    trace.t_fail("out-of-bailiwick NS");
                }
                ctx.state = State::Fail;
                return ctx.state;
            }
            Ok(AuthorityOutcome::Referral) => {
                let new_cut_name = ctx.plan.get(current_id).unwrap().zone_cut.name.clone();
                let new_ns_name = ctx.plan.get(current_id).unwrap().zone_cut.ns_name.clone();
                if let Some(trace) = ctx.trace.as_mut() {
                    trace.t_referral(&new_cut_name, &new_ns_name);
                }
                process_additional(&mut ctx.plan, current_id, &ctx.root_cut, msg);
                ctx.state = State::Done;
                return ctx.state;
            }
            Ok(AuthorityOutcome::NoReferral) => {
                let was_minimized = !name_utils::equal(&msg.questions[0].node, &query.sname);
                let classification = classify(msg);
                if was_minimized && matches!(classification, Classification::NoData | Classification::NxDomain) {
                    ctx.plan.get_mut(current_id).unwrap().flags.no_minimize = true;
                    if let Some(trace) = ctx.trace.as_mut() {
                        trace.t_minimize_retry(&query.sname);
                    }
                    ctx.state = State::Done;
                    return ctx.state;
                }

                if let Err(err) = process_answer(&mut ctx.plan, current_id, &ctx.root_cut, msg, ctx.answer.as_mut()) {
                    log::debug!("answer processing failed: {:?}", err);
                    ctx.state = State::Fail;
                    return ctx.state;
                }
            }
        }

        if ctx.plan.empty() {
            finalize_answer(msg, ctx.answer.as_mut());
            ctx.state = State::Done;
        } else {
            ctx.state = State::More;
        }
        ctx.state
    }

    /// Clears per-step scratch and returns the layer to `FULL`, ready for
    /// another `prepare_query` within the same resolution.
    pub fn reset(&mut self) -> State {
        match &mut self.ctx {
            Some(ctx) => {
                ctx.state = State::Full;
                ctx.state
            }
            None => State::Noop,
        }
    }

    /// Finishes the current resolution, releasing its context. Returns
    /// the assembled answer when one was produced.
    pub fn finish(&mut self) -> (State, Option<Message>) {
        match self.ctx.take() {
            Some(ctx) => (State::Noop, Some(ctx.answer.into_message())),
            None => (State::Noop, None),
        }
    }
}

fn build_query_message(id: u16, qname: &Name, qclass: Class, qtype: RecordType, config: &IteratorConfig) -> Message {
    let mut header = Header::default();
    header.id = id;
    header.recursion_desired = false;
    header.questions_count = 1;
    header.additionals_count = 1;

    let question = Question { node: qname.clone(), record_type: qtype, class: qclass };

    let opt = Record::OPT {
        node: Name::from_string(".").unwrap(),
        udp_payload_size: config.udp_payload_size,
        extended_rcode: 0,
        version: config.edns_version,
        flags: if config.dnssec_do_bit { 0x8000 } else { 0 },
        data_len: 0,
        rdata: vec![],
    };

    Message {
        header,
        questions: vec![question],
        answers: vec![],
        authorities: vec![],
        additionals: vec![opt],
    }
}
