pub mod executor;
pub mod types;
