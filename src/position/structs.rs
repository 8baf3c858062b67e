//! The structs
//!
use chrono::{DateTime, Local};
use serde_derive::{Serialize, Deserialize};

/// A binlog position for a specific server.
///
/// The derived ordering compares `file` first, and `position` only when the files are
/// equal, so the field order of this struct is significant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub position: u64,
}
/// A position as it is stored in the position log.
///
/// The hostname_port and timestamp fields are added to understand where and when the
/// position was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPosition {
    pub hostname_port: String,
    pub timestamp: DateTime<Local>,
    pub file: String,
    pub position: u64,
}
