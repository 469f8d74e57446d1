pub mod dns;
pub mod iterator;
pub mod log_setup;
pub mod wire;
