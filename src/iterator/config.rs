use serde::{Deserialize, Serialize};
use std::fs;

/// Configuration values governing a [`crate::iterator::driver::Layer`].
/// These are passive: the layer reads them when assembling outbound
/// packets but never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IteratorConfig {
    /// Advertised in the EDNS(0) OPT pseudo-RR of every outbound query.
    pub udp_payload_size: u16,
    /// Budget, in bytes, for the assembled user-facing answer. Exceeding
    /// it while copying an ANSWER record sets TC=1 instead of the record.
    pub max_answer_size: usize,
    /// EDNS version advertised in outbound queries. Only 0 is meaningful
    /// today (RFC 6891), but the field is carried for forward compatibility.
    pub edns_version: u8,
    /// Whether to set the DNSSEC OK bit in outbound queries.
    pub dnssec_do_bit: bool,
}

impl Default for IteratorConfig {
    fn default() -> Self {
        IteratorConfig {
            udp_payload_size: 4096,
            max_answer_size: 4096,
            edns_version: 0,
            dnssec_do_bit: false,
        }
    }
}

impl IteratorConfig {
    /// Reads and parses configuration values from a JSON-encoded file.
    pub fn from_file(path: &str) -> Result<Self, String> {
        let file_bytes = match fs::read_to_string(path) {
            Err(err) => return Err(err.to_string()),
            Ok(v) => v,
        };
        let conf = match serde_json::from_str::<IteratorConfig>(&file_bytes) {
            Err(err) => return Err(err.to_string()),
            Ok(conf) => conf,
        };
        conf.validate()?;
        Ok(conf)
    }

    /// Validates a configuration struct against some common errors.
    fn validate(&self) -> Result<(), String> {
        if self.udp_payload_size == 0 {
            return Err("invalid 'udp_payload_size': cannot be 0".to_string());
        }
        if self.max_answer_size == 0 {
            return Err("invalid 'max_answer_size': cannot be 0".to_string());
        }
        if (self.max_answer_size as u64) < (self.udp_payload_size as u64) {
            return Err("invalid 'max_answer_size': smaller than 'udp_payload_size'".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(IteratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let mut conf = IteratorConfig::default();
        conf.udp_payload_size = 0;
        assert!(conf.validate().is_err());

        let mut conf = IteratorConfig::default();
        conf.max_answer_size = 0;
        assert!(conf.validate().is_err());
    }
}
