use crate::dns::{Message, RespCode};

/// The coarse outcome of an authoritative response, derived from its
/// response code and the emptiness of its ANSWER section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// NOERROR with at least one record in ANSWER.
    Positive,
    /// NOERROR with an empty ANSWER section.
    NoData,
    /// NXDOMAIN.
    NxDomain,
    /// Any other response code.
    Error,
}

/// Classifies a response message per its response code and ANSWER section.
pub fn classify(msg: &Message) -> Classification {
    match msg.header.resp_code {
        RespCode::NxDomain => Classification::NxDomain,
        RespCode::NoError if !msg.answers.is_empty() => Classification::Positive,
        RespCode::NoError => Classification::NoData,
        _ => Classification::Error,
    }
}
