pub mod controller;
pub mod model;
pub mod routes;
pub mod schema;

pub use routes::monitor_routes;
