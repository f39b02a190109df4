mod harness;

pub use harness::{ExecutionIds, HarnessProvider, RetryPolicy};
