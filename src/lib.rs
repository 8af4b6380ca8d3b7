pub mod cli;
pub mod config;
pub mod notify;
pub mod report;
pub mod vendor;
