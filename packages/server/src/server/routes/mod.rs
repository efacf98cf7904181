// HTTP routes
pub mod agents;
pub mod agents_sdk;
pub mod health;
pub mod tasks;

pub use agents::*;
pub use agents_sdk::*;
pub use health::*;
pub use tasks::*;
