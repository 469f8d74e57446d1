/// Errors that can interrupt a single step of the iterator. These never
/// escape the [`crate::iterator::driver::Layer`] API: every entrypoint
/// folds them into the public `FAIL` state, logging the reason before
/// doing so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterError {
    /// The inbound packet failed to decode, or trailing bytes remained
    /// after every declared section was parsed.
    Malformed,
    /// The response carried a response code the iterator treats as fatal
    /// (anything but NOERROR/NXDOMAIN).
    BadRcode,
    /// An NS record in the AUTHORITY section named an owner outside the
    /// bailiwick of the current zone cut (cache/answer injection guard).
    OutOfBailiwickNs,
    /// A caller tried to pop a plan entry that wasn't on top of the stack.
    PlanDisorder,
}
