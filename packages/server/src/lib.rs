// Talent Agents - API Core
//
// This crate provides the backend for dispatching recruiting tasks to hosted
// AI agents. Tasks are recorded, queued and run by an in-process worker pool;
// clients poll for the outcome.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
