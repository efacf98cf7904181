//! Agent and task record stores.
//!
//! Both backends implement [`BaseAgentStore`](crate::kernel::BaseAgentStore)
//! and [`BaseTaskStore`](crate::kernel::BaseTaskStore); callers never know
//! which one they hold.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
