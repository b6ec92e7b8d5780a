pub mod publisher;
pub mod types;

pub use publisher::*;
pub use types::*;
