//! Task effects - background execution of claimed jobs.

mod execute;

pub use execute::TaskJobHandler;
