//! External build tool invocation
//!
//! Runs a process to completion while streaming its output line by line to
//! caller-supplied handlers:
//! - interactive requests attach the supplied input stream to the child
//! - batch requests never read input

pub mod executor;
pub mod request;

pub use executor::Invoker;
pub use request::{ConsoleOutput, InvocationRequest, OutputHandler};
