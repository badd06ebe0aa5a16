pub mod history;
pub mod runner;
pub mod state;
