use crate::dns::{Message, Record, RecordType};
use crate::iterator::answer::{AnswerBuilder, SectionHint};
use crate::iterator::classify::{classify, Classification};
use crate::iterator::errors::IterError;
use crate::iterator::name_utils;
use crate::iterator::plan::{QueryId, ResolutionPlan};
use crate::iterator::zone_cut::ZoneCut;

/// Outcome of scanning a response's AUTHORITY section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityOutcome {
    /// No NS record advanced the zone cut; the response answers directly.
    NoReferral,
    /// An in-bailiwick NS record moved the current query's zone cut down.
    Referral,
}

/// Scans the AUTHORITY section of `msg` for NS records, enforcing the
/// bailiwick guard that keeps a compromised or lying nameserver from
/// injecting delegations for zones it has no authority over: any NS
/// record whose owner isn't in the bailiwick of the current zone cut
/// rejects the whole packet with [`IterError::OutOfBailiwickNs`].
///
/// The first NS record that both passes the guard and actually descends
/// past the current cut (i.e. isn't just restating it) is taken as the
/// referral; it mutates `current`'s zone cut in place.
pub fn process_authority(plan: &mut ResolutionPlan, current: QueryId, msg: &Message) -> Result<AuthorityOutcome, IterError> {
    let cut_name = plan.get(current).unwrap().zone_cut.name.clone();

    for rr in &msg.authorities {
        if let Record::NS { node, name, .. } = rr {
            if !name_utils::in_bailiwick(node, &cut_name) {
                log::debug!("rejecting out-of-bailiwick NS {} for cut {}", node, cut_name);
                return Err(IterError::OutOfBailiwickNs);
            }
            if name_utils::equal(node, &cut_name) {
                continue;
            }
            let query = plan.get_mut(current).unwrap();
            query.zone_cut.set_name(node.clone(), name.clone());
            return Ok(AuthorityOutcome::Referral);
        }
    }

    Ok(AuthorityOutcome::NoReferral)
}

/// Harvests glue for the nameserver named by `current`'s (just-updated)
/// zone cut from `msg`'s ADDITIONAL section. If no glue was found at all,
/// pushes sub-queries to resolve the nameserver's address directly,
/// AAAA before A so that A is attempted first off the LIFO stack.
pub fn process_additional(plan: &mut ResolutionPlan, current: QueryId, root_cut: &ZoneCut, msg: &Message) {
    {
        let query = plan.get_mut(current).unwrap();
        for rr in &msg.additionals {
            if matches!(rr.record_type(), RecordType::A | RecordType::AAAA) && name_utils::equal(rr.node(), &query.zone_cut.ns_name) {
                query.zone_cut.set_ns_addr(rr);
            }
        }
    }

    let query = plan.get(current).unwrap();
    if query.zone_cut.has_glue() {
        return;
    }
    let ns_name = query.zone_cut.ns_name.clone();
    let sclass = query.sclass;

    plan.push(Some(current), ns_name.clone(), sclass, RecordType::AAAA, root_cut);
    plan.push(Some(current), ns_name, sclass, RecordType::A, root_cut);
}

/// Processes a non-referral response: copies its ANSWER into the
/// user-facing answer (if `current` is the bottommost query) or harvests
/// glue for a parent's nameserver from it (if `current` is a glue query),
/// follows any CNAME chain found along the way, and pops `current` off
/// the plan. A CNAME target outside the original QNAME's chain pushes a
/// follow-up query for the new name.
pub fn process_answer(
    plan: &mut ResolutionPlan,
    current: QueryId,
    root_cut: &ZoneCut,
    msg: &Message,
    answer: &mut dyn AnswerBuilder,
) -> Result<(), IterError> {
    let query = plan.get(current).unwrap().clone();
    let is_final = query.parent.is_none();
    let mut cname = query.sname.clone();
    let mut truncated = false;

    for rr in &msg.answers {
        if is_final {
            if !truncated {
                if answer.put(rr, SectionHint::Answer).is_err() {
                    answer.mark_truncated();
                    truncated = true;
                }
            }
        } else if let Some(parent_id) = query.parent {
            let parent_ns_name = plan.get(parent_id).map(|p| p.zone_cut.ns_name.clone());
            if let Some(parent_ns_name) = parent_ns_name {
                if matches!(rr.record_type(), RecordType::A | RecordType::AAAA) && name_utils::equal(rr.node(), &parent_ns_name) {
                    plan.get_mut(parent_id).unwrap().zone_cut.set_ns_addr(rr);
                }
            }
        }

        if name_utils::equal(rr.node(), &cname) {
            cname = match rr {
                Record::CNAME { name, .. } => name.clone(),
                _ => query.sname.clone(),
            };
        }
    }

    let followup = if !name_utils::equal(&cname, &query.sname) {
        Some((query.parent, cname, query.sclass, query.stype))
    } else {
        None
    };

    plan.pop(current).map_err(|_| IterError::PlanDisorder)?;

    if let Some((parent, sname, sclass, stype)) = followup {
        plan.push(parent, sname, sclass, stype, root_cut);
    }

    Ok(())
}

/// Finalizes the user-facing answer once the plan has drained: records
/// the last response's rcode and, for NODATA/NXDOMAIN outcomes, copies
/// its SOA record (if any) into AUTHORITY so the caller can derive a TTL
/// for negative caching.
pub fn finalize_answer(last_msg: &Message, answer: &mut dyn AnswerBuilder) {
    answer.set_rcode(last_msg.header.resp_code);

    if matches!(classify(last_msg), Classification::NxDomain | Classification::NoData) {
        if let Some(soa) = last_msg.authorities.iter().find(|r| r.record_type() == RecordType::SOA) {
            let _ = answer.put(soa, SectionHint::Authority);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{Class, Header, Name, RespCode};
    use crate::iterator::answer::MessageAnswerBuilder;

    fn name(s: &str) -> Name {
        Name::from_string(s).unwrap()
    }

    fn root_cut() -> ZoneCut {
        ZoneCut::new(name("."), name("a.root-servers.net."))
    }

    fn msg_with(resp_code: RespCode, authorities: Vec<Record>, answers: Vec<Record>, additionals: Vec<Record>) -> Message {
        let mut header = Header::default();
        header.resp_code = resp_code;
        Message { header, questions: vec![], answers, authorities, additionals }
    }

    #[test]
    fn test_process_authority_accepts_in_bailiwick_referral() {
        let mut plan = ResolutionPlan::new();
        let root = root_cut();
        let q = plan.push(None, name("www.example.com."), Class::IN, RecordType::A, &root);

        let ns = Record::NS {
            node: name("example.com."),
            class: Class::IN,
            ttl: 300,
            data_len: 0,
            name: name("ns1.example.com."),
        };
        let msg = msg_with(RespCode::NoError, vec![ns], vec![], vec![]);

        let outcome = process_authority(&mut plan, q, &msg).unwrap();
        assert_eq!(outcome, AuthorityOutcome::Referral);
        assert_eq!(plan.get(q).unwrap().zone_cut.name, name("example.com."));
    }

    #[test]
    fn test_process_authority_rejects_out_of_bailiwick() {
        let mut plan = ResolutionPlan::new();
        let root = root_cut();
        let mut q_cut = root_cut();
        q_cut.set_name(name("example.com."), name("ns1.example.com."));
        let q = plan.push(None, name("www.example.com."), Class::IN, RecordType::A, &root);
        plan.get_mut(q).unwrap().zone_cut = q_cut;

        let ns = Record::NS {
            node: name("attacker.net."),
            class: Class::IN,
            ttl: 300,
            data_len: 0,
            name: name("ns1.attacker.net."),
        };
        let msg = msg_with(RespCode::NoError, vec![ns], vec![], vec![]);

        let err = process_authority(&mut plan, q, &msg).unwrap_err();
        assert_eq!(err, IterError::OutOfBailiwickNs);
    }

    #[test]
    fn test_process_additional_pushes_both_probes_without_glue() {
        let mut plan = ResolutionPlan::new();
        let root = root_cut();
        let q = plan.push(None, name("www.example.com."), Class::IN, RecordType::A, &root);
        plan.get_mut(q).unwrap().zone_cut.set_name(name("example.com."), name("ns1.example.com."));

        let msg = msg_with(RespCode::NoError, vec![], vec![], vec![]);
        process_additional(&mut plan, q, &root, &msg);

        assert_eq!(plan.depth(), 3);
        let a_probe = plan.current().unwrap();
        assert_eq!(a_probe.stype, RecordType::A);
        let aaaa_probe = plan.get(plan.current_id().unwrap() - 1).unwrap();
        assert_eq!(aaaa_probe.stype, RecordType::AAAA);
    }

    #[test]
    fn test_process_additional_harvests_glue() {
        let mut plan = ResolutionPlan::new();
        let root = root_cut();
        let q = plan.push(None, name("www.example.com."), Class::IN, RecordType::A, &root);
        plan.get_mut(q).unwrap().zone_cut.set_name(name("example.com."), name("ns1.example.com."));

        let glue = Record::A {
            node: name("ns1.example.com."),
            class: Class::IN,
            ttl: 300,
            data_len: 4,
            address: [192, 0, 2, 1],
        };
        let msg = msg_with(RespCode::NoError, vec![], vec![], vec![glue]);
        process_additional(&mut plan, q, &root, &msg);

        assert_eq!(plan.depth(), 1);
        assert!(plan.get(q).unwrap().zone_cut.has_glue());
    }

    #[test]
    fn test_process_answer_follows_cname() {
        let mut plan = ResolutionPlan::new();
        let root = root_cut();
        let q = plan.push(None, name("www.example.com."), Class::IN, RecordType::A, &root);

        let cname = Record::CNAME {
            node: name("www.example.com."),
            class: Class::IN,
            ttl: 300,
            data_len: 0,
            name: name("alias.example.com."),
        };
        let msg = msg_with(RespCode::NoError, vec![], vec![cname], vec![]);
        let mut builder = MessageAnswerBuilder::new(4096);

        process_answer(&mut plan, q, &root, &msg, &mut builder).unwrap();

        assert!(plan.empty() == false || plan.current().is_some());
        assert_eq!(plan.current().unwrap().sname, name("alias.example.com."));
    }

    #[test]
    fn test_process_answer_pops_without_followup() {
        let mut plan = ResolutionPlan::new();
        let root = root_cut();
        let q = plan.push(None, name("www.example.com."), Class::IN, RecordType::A, &root);

        let a = Record::A {
            node: name("www.example.com."),
            class: Class::IN,
            ttl: 300,
            data_len: 4,
            address: [192, 0, 2, 1],
        };
        let msg = msg_with(RespCode::NoError, vec![], vec![a], vec![]);
        let mut builder = MessageAnswerBuilder::new(4096);

        process_answer(&mut plan, q, &root, &msg, &mut builder).unwrap();
        assert!(plan.empty());
    }
}
