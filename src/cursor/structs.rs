//! The structs
//!
use serde_derive::{Serialize, Deserialize};

/// A single column value as returned by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// Column data that is not valid UTF-8.
    Bytes(Vec<u8>),
}
/// One row of a result set: column names mapped to values, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub(crate) columns: Vec<(String, Value)>,
}
/// A non-fatal diagnostic the server produced while executing a statement
/// (the output of `SHOW WARNINGS`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub level: String,
    pub code: u32,
    pub message: String,
}
/// Pull based access to the rows of one execution.
///
/// This is the one-shot execution handle the driver returns; `fetch_one` returns
/// `Ok(None)` once the rows are exhausted.
pub trait RowSource {
    fn fetch_one(&mut self) -> anyhow::Result<Option<Row>>;
}
/// A row source over rows that are already in memory.
#[derive(Debug, Default)]
pub struct BufferedRows {
    pub(crate) rows: std::collections::VecDeque<Row>,
}
/// The forward-only cursor over the rows of one execution.
pub struct ResultCursor {
    pub(crate) source: Box<dyn RowSource + Send>,
    pub(crate) current: Option<Row>,
    pub(crate) warnings: Vec<Warning>,
}
