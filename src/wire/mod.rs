mod buffer;

pub use buffer::BitsBuffer;

/// Alias used throughout `dns::*` codec functions, matching the shorter
/// name the wire-format code was originally written against.
pub type BitsBuf = BitsBuffer;
