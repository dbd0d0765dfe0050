pub mod api;
pub mod cli;
pub mod core;
pub mod directory;
pub mod notify;
pub mod scheduling;
