pub mod engine;
pub mod error;
pub mod io;
pub mod manifest;
pub mod metrics;
pub mod model;
