//! Data layer: read access to captured logs

pub mod error;
pub mod logs;

pub use error::LogQueryError;
pub use logs::{LogReader, SessionEntry, SessionSummary};
