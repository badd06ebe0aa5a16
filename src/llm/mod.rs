pub mod brain;
pub mod client;
pub mod locator;
pub mod parse;
pub mod prompts;
pub mod types;
