use crate::dns::{Message, Name, RecordType};
use colored::*;
use std::fmt::{self, Debug, Display, Formatter};

/// Configuration for a [`Trace`] collector. `silent` disables collection
/// entirely; `verbose` additionally records full raw responses, not just
/// the decisions the iterator made about them.
#[derive(Debug, Clone)]
pub struct TraceParams {
    pub verbose: bool,
    pub silent: bool,
    pub color: bool,
}

impl Default for TraceParams {
    fn default() -> Self {
        TraceParams { verbose: false, silent: false, color: true }
    }
}

/// An optional, purely observational collector of the steps the iterator
/// takes while resolving a single query. Attaching one never changes the
/// resolution outcome; it only records it.
pub struct Trace {
    lines: Vec<String>,
    conf: TraceParams,
}

impl Trace {
    pub fn new(conf: TraceParams) -> Self {
        Trace { lines: Vec::with_capacity(32), conf }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new(TraceParams::default())
    }
}

impl Trace {
    pub fn t_begin(&mut self, qname: &Name, qtype: RecordType) {
        if self.conf.silent {
            return;
        }
        self.push(format!("begin: {} {:?}", qname, qtype));
    }

    pub fn t_query(&mut self, qname: &Name, qtype: RecordType, ns_name: &Name) {
        if self.conf.silent {
            return;
        }
        self.push(format!("query: {} {:?} -> {}", qname, qtype, ns_name));
    }

    pub fn t_referral(&mut self, new_cut: &Name, ns_name: &Name) {
        if self.conf.silent {
            return;
        }
        self.push(format!("referral: descending to {} via {}", new_cut, ns_name));
    }

    pub fn t_cname(&mut self, from: &Name, to: &Name) {
        if self.conf.silent {
            return;
        }
        self.push(format!("cname: {} -> {}", from, to));
    }

    pub fn t_minimize_retry(&mut self, sname: &Name) {
        if self.conf.silent {
            return;
        }
        self.push(format!("minimization retry: asking full name {}", sname));
    }

    pub fn t_tcp_promotion(&mut self, sname: &Name) {
        if self.conf.silent {
            return;
        }
        self.push(format!("truncated over udp: retrying {} over tcp", sname));
    }

    pub fn t_fail(&mut self, reason: &str) {
        if self.conf.silent {
            return;
        }
        self.push(format!("fail: {}", reason));
    }

    pub fn t_raw_resp(&mut self, message: &Message) {
        if self.conf.silent || !self.conf.verbose {
            return;
        }
        self.push(format!("raw response: {:?}", message.header));
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }
}

impl Display for Trace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.lines.is_empty() {
            return write!(f, "<no trace>");
        }
        for line in &self.lines {
            if self.conf.color {
                writeln!(f, "{}", line.yellow())?;
            } else {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}

impl Debug for Trace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_collects_nothing() {
        let mut trace = Trace::new(TraceParams { silent: true, ..TraceParams::default() });
        trace.t_begin(&Name::from_string("example.com.").unwrap(), RecordType::A);
        assert!(trace.is_empty());
    }

    #[test]
    fn test_records_events() {
        let mut trace = Trace::new(TraceParams { color: false, ..TraceParams::default() });
        trace.t_begin(&Name::from_string("example.com.").unwrap(), RecordType::A);
        assert!(!trace.is_empty());
    }
}
