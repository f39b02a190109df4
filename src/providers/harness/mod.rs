mod client;
mod graph;
mod links;
mod provider;
mod types;

pub use client::RetryPolicy;
pub use provider::HarnessProvider;
pub use types::ExecutionIds;
