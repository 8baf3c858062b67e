//! The impls and functions.
//!
use std::{fmt, fs, path::Path, str::FromStr};
use chrono::Local;
use log::*;
use anyhow::{Context, Result};
use crate::cursor::Row;
use crate::error::ServerError;
use crate::position::{Position, StoredPosition};

impl Position {
    pub fn new(file: impl Into<String>, position: u64) -> Self {
        Position { file: file.into(), position }
    }
    /// Build a position from a row of `SHOW MASTER STATUS` (columns `File` and `Position`).
    pub fn from_row(row: &Row) -> Result<Position, ServerError> {
        let file = row.get("File")?;
        let position = row.get("Position")?;
        match (file.as_str(), position.as_u64()) {
            (Some(file), Some(position)) => Ok(Position::new(file, position)),
            _ => Err(ServerError::InvalidPosition(format!("{}:{}", file, position))),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.position)
    }
}

impl FromStr for Position {
    type Err = ServerError;

    /// The offset is everything after the last colon, so file names containing a
    /// colon still parse back.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (file, position) = text
            .rsplit_once(':')
            .ok_or_else(|| ServerError::InvalidPosition(text.to_string()))?;
        if position.is_empty() || !position.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ServerError::InvalidPosition(text.to_string()));
        }
        let position = position
            .parse::<u64>()
            .map_err(|_| ServerError::InvalidPosition(text.to_string()))?;
        Ok(Position::new(file, position))
    }
}

impl StoredPosition {
    pub fn new(hostname_port: &str, position: &Position) -> Self {
        StoredPosition {
            hostname_port: hostname_port.to_string(),
            timestamp: Local::now(),
            file: position.file.clone(),
            position: position.position,
        }
    }
    pub fn position(&self) -> Position {
        Position::new(self.file.as_str(), self.position)
    }
    /// Append positions to the position log at `path`.
    /// The CSV header is only written when the file is new or empty.
    pub fn append_to_log(
        path: &Path,
        positions: &[StoredPosition],
    ) -> Result<()>
    {
        let write_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Cannot open position log: {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for row in positions {
            writer.serialize(row)
                .with_context(|| format!("Unable to serialize: {} {} {}", row.hostname_port, row.timestamp, row.position()))?;
        }
        writer.flush()
            .with_context(|| "Error flushing buffer")?;
        debug!("appended {} positions to {}", positions.len(), path.display());
        Ok(())
    }
    pub fn read_log(
        path: &Path,
    ) -> Result<Vec<StoredPosition>>
    {
        let file = fs::File::open(path)
            .with_context(|| format!("Error opening file: {}", path.display()))?;
        let mut reader = csv::Reader::from_reader(file);
        let mut positions = Vec::new();
        for row in reader.deserialize() {
            let data: StoredPosition = row
                .with_context(|| "Error deserialize row")?;
            positions.push(data);
        }
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Value;

    fn positions() -> Vec<Position> {
        vec![
            Position::new("master-bin.00001", 4711),
            Position::new("master-bin.00001", 9393),
            Position::new("master-bin.00002", 102),
        ]
    }

    #[test]
    fn unit_position_text_round_trip() {
        for position in positions() {
            let text = position.to_string();
            assert_eq!(text.parse::<Position>().unwrap(), position);
        }
        let odd = Position::new("host:3306-bin.000007", 0);
        assert_eq!(odd.to_string().parse::<Position>().unwrap(), odd);
    }

    #[test]
    fn unit_position_ordering_follows_list_order() {
        let positions = positions();
        for (i, i_pos) in positions.iter().enumerate() {
            for (j, j_pos) in positions.iter().enumerate() {
                if i < j {
                    assert!(i_pos < j_pos);
                } else if i == j {
                    assert_eq!(i_pos, j_pos);
                } else {
                    assert!(i_pos > j_pos);
                }
            }
        }
    }

    #[test]
    fn unit_position_file_dominates_offset() {
        assert!(Position::new("master-bin.00001", 9393) > Position::new("master-bin.00001", 4711));
        assert!(Position::new("master-bin.00002", 102) > Position::new("master-bin.00001", 9393));
    }

    #[test]
    fn unit_position_parse_rejects_garbage() {
        assert!(matches!("master-bin.00001".parse::<Position>(), Err(ServerError::InvalidPosition(_))));
        assert!(matches!("master-bin.00001:-4".parse::<Position>(), Err(ServerError::InvalidPosition(_))));
        assert!(matches!("master-bin.00001:abc".parse::<Position>(), Err(ServerError::InvalidPosition(_))));
        assert!(matches!("master-bin.00001:+5".parse::<Position>(), Err(ServerError::InvalidPosition(_))));
        assert!(matches!("master-bin.00001:".parse::<Position>(), Err(ServerError::InvalidPosition(_))));
    }

    #[test]
    fn unit_position_from_master_status_row() {
        // SHOW MASTER STATUS over the text protocol returns every column as text.
        let row = Row::new(vec![
            ("File".to_string(), Value::Text("master-bin.000003".to_string())),
            ("Position".to_string(), Value::Text("154".to_string())),
            ("Binlog_Do_DB".to_string(), Value::Text(String::new())),
        ]);
        assert_eq!(Position::from_row(&row).unwrap(), Position::new("master-bin.000003", 154));

        let row = Row::new(vec![("File".to_string(), Value::Null), ("Position".to_string(), Value::UInt(4))]);
        assert!(matches!(Position::from_row(&row), Err(ServerError::InvalidPosition(_))));
    }

    #[test]
    fn unit_position_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.csv");
        let first = StoredPosition::new("db1:3306", &Position::new("master-bin.00001", 4711));
        let second = StoredPosition::new("db2:3306", &Position::new("master-bin.00002", 102));
        StoredPosition::append_to_log(&path, &[first.clone()]).unwrap();
        StoredPosition::append_to_log(&path, &[second.clone()]).unwrap();

        let stored = StoredPosition::read_log(&path).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].hostname_port, "db1:3306");
        assert_eq!(stored[0].position(), first.position());
        assert_eq!(stored[1].position(), second.position());
    }
}
