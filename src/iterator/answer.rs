use crate::dns::{Header, Message, Record, RespCode};
use crate::wire::BitsBuffer;

/// Which section of the outgoing answer a record belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionHint {
    Answer,
    Authority,
}

/// Collaborator the driver hands resource records to while assembling the
/// user-facing response. `put` fails (without panicking) when copying the
/// candidate record would push the message past its size budget; the
/// driver reacts by calling [`AnswerBuilder::mark_truncated`] and setting
/// TC=1 on the final answer, without aborting the CNAME chase in progress.
pub trait AnswerBuilder {
    fn put(&mut self, rr: &Record, hint: SectionHint) -> Result<(), ()>;
    fn set_rcode(&mut self, rcode: RespCode);
    fn mark_truncated(&mut self);
    fn into_message(self: Box<Self>) -> Message;
}

/// Default [`AnswerBuilder`], accumulating records into a [`Message`]
/// under construction. Each candidate record is size-checked by actually
/// encoding it, so truncation tracks the real wire size rather than an
/// RR-count heuristic.
pub struct MessageAnswerBuilder {
    message: Message,
    max_size: usize,
    current_size: usize,
}

const DNS_HEADER_SIZE: usize = 12;

impl MessageAnswerBuilder {
    pub fn new(max_size: usize) -> Self {
        MessageAnswerBuilder {
            message: Message {
                header: Header::default(),
                questions: vec![],
                answers: vec![],
                authorities: vec![],
                additionals: vec![],
            },
            max_size,
            current_size: DNS_HEADER_SIZE,
        }
    }
}

impl AnswerBuilder for MessageAnswerBuilder {
    fn put(&mut self, rr: &Record, hint: SectionHint) -> Result<(), ()> {
        let mut buf = BitsBuffer::new();
        rr.encode_to_buf(&mut buf).map_err(|_| ())?;
        let encoded_len = buf.into_vec().len();

        if self.current_size + encoded_len > self.max_size {
            return Err(());
        }
        self.current_size += encoded_len;

        match hint {
            SectionHint::Answer => {
                self.message.answers.push(rr.clone());
                self.message.header.answers_count += 1;
            }
            SectionHint::Authority => {
                self.message.authorities.push(rr.clone());
                self.message.header.authorities_count += 1;
            }
        }
        Ok(())
    }

    fn set_rcode(&mut self, rcode: RespCode) {
        self.message.header.resp_code = rcode;
    }

    fn mark_truncated(&mut self) {
        self.message.header.truncated = true;
    }

    fn into_message(self: Box<Self>) -> Message {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{Class, Name};

    fn a_record(owner: &str) -> Record {
        Record::A {
            node: Name::from_string(owner).unwrap(),
            class: Class::IN,
            ttl: 300,
            data_len: 4,
            address: [192, 0, 2, 1],
        }
    }

    #[test]
    fn test_put_accumulates_answers() {
        let mut builder = MessageAnswerBuilder::new(4096);
        assert!(builder.put(&a_record("www.example.com."), SectionHint::Answer).is_ok());
        let msg = Box::new(builder).into_message();
        assert_eq!(msg.answers.len(), 1);
        assert_eq!(msg.header.answers_count, 1);
    }

    #[test]
    fn test_put_fails_past_budget() {
        let mut builder = MessageAnswerBuilder::new(DNS_HEADER_SIZE + 5);
        assert!(builder.put(&a_record("www.example.com."), SectionHint::Answer).is_err());
    }
}
