use rand::Rng;

/// Source of unpredictable 16-bit values for transaction ids, letting
/// tests supply a deterministic stand-in for the driver's own randomness.
pub trait Random {
    fn u16(&self) -> u16;
}

/// Default [`Random`] implementation, backed by the thread-local CSPRNG.
pub struct SystemRandom;

impl Random for SystemRandom {
    fn u16(&self) -> u16 {
        rand::thread_rng().gen::<u16>()
    }
}
