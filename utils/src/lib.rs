//! Shared utilities for proofdesk.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
