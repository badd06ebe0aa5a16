pub mod agent;
pub mod config;
pub mod errors;
pub mod executor;
pub mod llm;
pub mod perception;
