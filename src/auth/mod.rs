pub mod manager;
pub mod token_fetch;
