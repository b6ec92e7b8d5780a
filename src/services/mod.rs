pub mod events;
pub mod log_sink;
pub mod monitor;
pub mod query;
pub mod signing;
pub mod transport;
