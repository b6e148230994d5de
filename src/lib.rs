pub mod config;
pub mod domain;
pub mod error;
pub mod invoker;
pub mod rewrite;
pub mod scm;
pub mod ui;
pub mod version;
pub mod warnings;
pub mod xml;

pub use error::{ReleaseError, Result};
