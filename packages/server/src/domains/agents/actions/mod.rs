//! Agent actions - registry CRUD and direct capability calls.

mod direct;
mod registry;

pub use direct::{run_direct, DirectTaskRequest};
pub use registry::{create_agent, get_agent, list_agents};
