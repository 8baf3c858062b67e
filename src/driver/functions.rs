//! The impls and functions.
//!
use log::*;
use anyhow::{Context, Result};
use mysql::prelude::Queryable;
use crate::cursor::{BufferedRows, Row, Value, Warning};
use crate::driver::{ConnectOptions, Connection, Connector, Execution, MysqlConnection, MysqlConnector, Params};

impl ConnectOptions {
    /// `host:port`, or the socket path for local connections; used in log and error messages.
    pub fn endpoint(&self) -> String {
        match &self.socket {
            Some(socket) => format!("{}:{}", self.host, socket.display()),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Params {
    fn to_mysql(&self) -> Option<mysql::Params> {
        match self {
            Params::None => None,
            Params::Positional(values) => Some(mysql::Params::Positional(
                values.iter().map(to_mysql_value).collect()
            )),
            Params::Named(pairs) => {
                let pairs: Vec<(String, mysql::Value)> = pairs.iter()
                    .map(|(name, value)| (name.clone(), to_mysql_value(value)))
                    .collect();
                Some(mysql::Params::from(pairs))
            },
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

fn to_mysql_value(value: &Value) -> mysql::Value {
    match value {
        Value::Null => mysql::Value::NULL,
        Value::Int(number) => mysql::Value::Int(*number),
        Value::UInt(number) => mysql::Value::UInt(*number),
        Value::Float(number) => mysql::Value::Double(*number),
        Value::Text(text) => mysql::Value::Bytes(text.clone().into_bytes()),
        Value::Bytes(bytes) => mysql::Value::Bytes(bytes.clone()),
    }
}

fn from_mysql_value(value: &mysql::Value) -> Value {
    match value {
        mysql::Value::NULL => Value::Null,
        mysql::Value::Bytes(bytes) => match String::from_utf8(bytes.clone()) {
            Ok(text) => Value::Text(text),
            Err(_) => Value::Bytes(bytes.clone()),
        },
        mysql::Value::Int(number) => Value::Int(*number),
        mysql::Value::UInt(number) => Value::UInt(*number),
        mysql::Value::Float(number) => Value::Float(f64::from(*number)),
        mysql::Value::Double(number) => Value::Float(*number),
        // dates and times: keep the literal without the quotes
        other => Value::Text(other.as_sql(true).trim_matches('\'').to_string()),
    }
}

fn convert_rows(
    rows: impl Iterator<Item = mysql::Result<mysql::Row>>,
) -> Result<Vec<Row>>
{
    let mut converted = Vec::new();
    for row in rows {
        let row = row.with_context(|| "Error reading row")?;
        let columns = row.columns_ref()
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let value = row.as_ref(index).map(from_mysql_value).unwrap_or(Value::Null);
                (column.name_str().to_string(), value)
            })
            .collect();
        converted.push(Row::new(columns));
    }
    Ok(converted)
}

impl Connector for MysqlConnector {
    fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Connection>> {
        let mut builder = mysql::OptsBuilder::new()
            .ip_or_hostname(Some(options.host.as_str()))
            .tcp_port(options.port)
            .user(Some(options.credential.name.as_str()))
            .pass(Some(options.credential.secret.as_str()));
        if let Some(socket) = &options.socket {
            builder = builder.socket(Some(socket.to_string_lossy().to_string()));
        }
        if !options.database.is_empty() {
            builder = builder.db_name(Some(options.database.as_str()));
        }
        let conn = mysql::Conn::new(builder)
            .with_context(|| format!("Error connecting to {}", options.endpoint()))?;
        debug!("connected to {} as {}", options.endpoint(), options.credential.name);
        Ok(Box::new(MysqlConnection { conn, hostname_port: options.endpoint() }))
    }
}

impl Connection for MysqlConnection {
    fn select_database(&mut self, database: &str) -> Result<()> {
        self.conn.query_drop(format!("USE `{}`", database.replace('`', "``")))
            .with_context(|| format!("Error selecting database {} on {}", database, self.hostname_port))
    }
    fn execute(&mut self, command: &str, params: &Params) -> Result<Execution> {
        // the rows borrow the connection, so they are read before SHOW WARNINGS can run
        let (rows, warning_count) = match params.to_mysql() {
            None => {
                let mut result = self.conn.query_iter(command)
                    .with_context(|| format!("Error executing on {}: {}", self.hostname_port, command))?;
                let rows = convert_rows(result.by_ref())?;
                (rows, result.warnings())
            },
            Some(params) => {
                let mut result = self.conn.exec_iter(command, params)
                    .with_context(|| format!("Error executing on {}: {}", self.hostname_port, command))?;
                let rows = convert_rows(result.by_ref())?;
                (rows, result.warnings())
            },
        };
        let warnings = if warning_count > 0 {
            self.conn.query_map("SHOW WARNINGS", |(level, code, message): (String, u32, String)| {
                Warning { level, code, message }
            })
            .with_context(|| format!("Error reading warnings on {}", self.hostname_port))?
        } else {
            Vec::new()
        };
        trace!("{}: {} rows, {} warnings", self.hostname_port, rows.len(), warnings.len());
        Ok(Execution { rows: Box::new(BufferedRows::new(rows)), warnings })
    }
}
