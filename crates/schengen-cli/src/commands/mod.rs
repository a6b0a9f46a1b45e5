pub mod common;
pub mod compliance;
pub mod config;
pub mod queue;
pub mod trip;
