//! Admission and resilience primitives wrapped around downstream calls

mod classify;
mod gate;
mod retry;
mod timeout;

pub use classify::{classify, FailureClass};
pub use gate::{ConcurrencyGate, GatePermit, DEFAULT_GATE_CAPACITY};
pub use retry::{FixedJitter, JitterSource, RandomJitter, ResilientInvoker, RetryPolicy};
pub use timeout::TimeoutGuard;
