mod core;
mod execution;

pub use self::core::{HarnessClient, RetryPolicy};
