pub mod dedup;
pub mod engine;
pub mod poller;
pub mod types;

pub use dedup::{DedupCache, Fingerprint};
pub use engine::{EngineSettings, MonitorEngine};
pub use poller::Poller;
pub use types::*;
