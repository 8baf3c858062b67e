//! The impls and functions.
//!
use std::{collections::VecDeque, fmt};
use log::*;
use crate::error::{Result, ServerError};
use crate::cursor::{BufferedRows, ResultCursor, Row, RowSource, Value, Warning};

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
    /// Numeric columns come back as text over the text protocol, so text is parsed too.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(number) => Some(*number),
            Value::UInt(number) => i64::try_from(*number).ok(),
            Value::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(number) => u64::try_from(*number).ok(),
            Value::UInt(number) => Some(*number),
            Value::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(number) => write!(f, "{}", number),
            Value::UInt(number) => write!(f, "{}", number),
            Value::Float(number) => write!(f, "{}", number),
            Value::Text(text) => write!(f, "{}", text),
            Value::Bytes(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self { Value::Text(text.to_string()) }
}
impl From<String> for Value {
    fn from(text: String) -> Self { Value::Text(text) }
}
impl From<i64> for Value {
    fn from(number: i64) -> Self { Value::Int(number) }
}
impl From<u64> for Value {
    fn from(number: u64) -> Self { Value::UInt(number) }
}
impl From<u32> for Value {
    fn from(number: u32) -> Self { Value::UInt(u64::from(number)) }
}

/// A key to look up a field in a [Row]: a column name or a column position.
pub trait RowIndex {
    fn lookup<'r>(&self, row: &'r Row) -> Option<&'r Value>;
    fn describe(&self) -> String;
}
impl RowIndex for &str {
    fn lookup<'r>(&self, row: &'r Row) -> Option<&'r Value> {
        row.columns.iter().find(|(name, _)| name.as_str() == *self).map(|(_, value)| value)
    }
    fn describe(&self) -> String { self.to_string() }
}
impl RowIndex for String {
    fn lookup<'r>(&self, row: &'r Row) -> Option<&'r Value> {
        self.as_str().lookup(row)
    }
    fn describe(&self) -> String { self.clone() }
}
impl RowIndex for usize {
    fn lookup<'r>(&self, row: &'r Row) -> Option<&'r Value> {
        row.columns.get(*self).map(|(_, value)| value)
    }
    fn describe(&self) -> String { format!("#{}", self) }
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Row { columns }
    }
    pub fn get<K: RowIndex>(&self, key: K) -> Result<&Value> {
        key.lookup(self).ok_or_else(|| ServerError::NoSuchField(key.describe()))
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl BufferedRows {
    pub fn new(rows: Vec<Row>) -> Self {
        BufferedRows { rows: VecDeque::from(rows) }
    }
}
impl RowSource for BufferedRows {
    fn fetch_one(&mut self) -> anyhow::Result<Option<Row>> {
        Ok(self.rows.pop_front())
    }
}

impl ResultCursor {
    /// Wrap a row source, pulling its first row right away.
    pub fn new(
        mut source: Box<dyn RowSource + Send>,
        warnings: Vec<Warning>,
    ) -> Result<Self>
    {
        let current = source.fetch_one().map_err(ServerError::Connection)?;
        trace!("cursor created, first row present: {}", current.is_some());
        Ok(ResultCursor { source, current, warnings })
    }
    /// Hand out the buffered row and pull the next one.
    /// Once exhausted, every call returns `Ok(None)` and the source is not touched again.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        if self.current.is_none() {
            return Ok(None);
        }
        let next = self.source.fetch_one().map_err(ServerError::Connection)?;
        Ok(std::mem::replace(&mut self.current, next))
    }
    /// The field `key` of the current row.
    pub fn get<K: RowIndex>(&self, key: K) -> Result<&Value> {
        self.current.as_ref().ok_or(ServerError::EmptyRow)?.get(key)
    }
    /// The single value of a one-column current row.
    pub fn scalar(&self) -> Result<&Value> {
        let row = self.current.as_ref().ok_or(ServerError::EmptyRow)?;
        match row.columns.as_slice() {
            [(_, value)] => Ok(value),
            columns => Err(ServerError::NotScalar(columns.len())),
        }
    }
    pub fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }
    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }
    /// The warnings the server raised while executing the statement.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

impl Iterator for ResultCursor {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

impl fmt::Debug for ResultCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCursor")
            .field("current", &self.current)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};

    fn row(columns: &[(&str, Value)]) -> Row {
        Row::new(columns.iter().map(|(name, value)| (name.to_string(), value.clone())).collect())
    }
    fn cursor(rows: Vec<Row>) -> ResultCursor {
        ResultCursor::new(Box::new(BufferedRows::new(rows)), Vec::new()).unwrap()
    }

    /// Counts the pulls, to verify the cursor stops pulling once exhausted.
    struct CountingRows {
        rows: VecDeque<Row>,
        pulls: Arc<AtomicUsize>,
    }
    impl RowSource for CountingRows {
        fn fetch_one(&mut self) -> anyhow::Result<Option<Row>> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.pop_front())
        }
    }

    #[test]
    fn unit_empty_cursor_is_exhausted_immediately() {
        let mut result = cursor(Vec::new());
        assert!(result.is_exhausted());
        assert!(result.next_row().unwrap().is_none());
        assert!(matches!(result.get("Database"), Err(ServerError::EmptyRow)));
        assert!(matches!(result.scalar(), Err(ServerError::EmptyRow)));
    }

    #[test]
    fn unit_cursor_yields_rows_in_order_then_stays_exhausted() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let source = CountingRows {
            rows: VecDeque::from(vec![
                row(&[("Database", Value::from("mysql"))]),
                row(&[("Database", Value::from("test"))]),
            ]),
            pulls: pulls.clone(),
        };
        let mut result = ResultCursor::new(Box::new(source), Vec::new()).unwrap();
        // the first row is pulled eagerly
        assert_eq!(pulls.load(Ordering::SeqCst), 1);
        assert_eq!(result.get("Database").unwrap(), &Value::from("mysql"));

        let names: Vec<String> = result.by_ref()
            .map(|row| row.unwrap().get("Database").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["mysql", "test"]);
        assert!(result.next_row().unwrap().is_none());
        assert!(result.next_row().unwrap().is_none());
        assert_eq!(pulls.load(Ordering::SeqCst), 3);
        assert!(matches!(result.get(0_usize), Err(ServerError::EmptyRow)));
    }

    #[test]
    fn unit_scalar_needs_exactly_one_column() {
        let result = cursor(vec![row(&[("@@server_id", Value::UInt(3))])]);
        assert_eq!(result.scalar().unwrap().as_u64(), Some(3));

        let result = cursor(vec![row(&[("File", Value::from("master-bin.000001")), ("Position", Value::UInt(4))])]);
        assert!(matches!(result.scalar(), Err(ServerError::NotScalar(2))));
    }

    #[test]
    fn unit_field_by_name_and_position() {
        let result = cursor(vec![row(&[("File", Value::from("master-bin.000001")), ("Position", Value::UInt(4))])]);
        assert_eq!(result.get("Position").unwrap(), &Value::UInt(4));
        assert_eq!(result.get(0_usize).unwrap(), &Value::from("master-bin.000001"));
        assert!(matches!(result.get("Binlog_Do_DB"), Err(ServerError::NoSuchField(_))));
        assert!(matches!(result.get(7_usize), Err(ServerError::NoSuchField(_))));
    }

    #[test]
    fn unit_value_conversions() {
        assert_eq!(Value::from("154").as_u64(), Some(154));
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::UInt(12).as_i64(), Some(12));
        assert_eq!(Value::Null.to_string(), "NULL");
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bytes(b"abc".to_vec()).as_str(), None);
    }
}
