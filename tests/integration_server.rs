use std::{path::Path, sync::{Arc, Mutex}};
use anyhow::Result;
use mysql_replicant::{Credential, Position, Server, ServerError};
use mysql_replicant::configmanager::{ConfigManager, OptionFile};
use mysql_replicant::cursor::{BufferedRows, Row, Value};
use mysql_replicant::driver::{ConnectOptions, Connection, Connector, Execution, Params};
use mysql_replicant::machine::Machine;
use mysql_replicant::remote::CommandRunner;
use mysql_replicant::roles::{Master, Role, Slave};

type Log = Arc<Mutex<Vec<String>>>;

fn record(log: &Log, entry: String) {
    log.lock().unwrap().push(entry);
}

struct LoggingMachine(Log);
impl Machine for LoggingMachine {
    fn defaults_file(&self) -> &str { "/etc/mysql/my.cnf" }
    fn start_server(&self, server: &Server) -> Result<()> {
        record(&self.0, format!("start {}", server.name));
        Ok(())
    }
    fn stop_server(&self, server: &Server) -> Result<()> {
        record(&self.0, format!("stop {}", server.name));
        Ok(())
    }
}

struct InMemoryConfig(Mutex<OptionFile>);
impl ConfigManager for InMemoryConfig {
    fn fetch_config(&self, _server: &Server, _path: Option<&Path>) -> Result<OptionFile> {
        Ok(self.0.lock().unwrap().clone())
    }
    fn replace_config(&self, _server: &Server, config: &OptionFile, _path: Option<&Path>) -> Result<()> {
        *self.0.lock().unwrap() = config.clone();
        Ok(())
    }
}

struct SilentRunner;
impl CommandRunner for SilentRunner {
    fn run(&self, _argv: &[String]) -> std::io::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Every connection answers SHOW MASTER STATUS with a fixed position, everything else
/// with an empty result.
struct FixedConnector(Log);
struct FixedConnection(Log);
impl Connector for FixedConnector {
    fn connect(&self, _options: &ConnectOptions) -> Result<Box<dyn Connection>> {
        record(&self.0, "connect".to_string());
        Ok(Box::new(FixedConnection(self.0.clone())))
    }
}
impl Connection for FixedConnection {
    fn select_database(&mut self, database: &str) -> Result<()> {
        record(&self.0, format!("use {}", database));
        Ok(())
    }
    fn execute(&mut self, command: &str, _params: &Params) -> Result<Execution> {
        record(&self.0, command.to_string());
        let rows = if command == "SHOW MASTER STATUS" {
            vec![Row::new(vec![
                ("File".to_string(), Value::from("db1-bin.000001")),
                ("Position".to_string(), Value::from("4711")),
            ])]
        } else {
            Vec::new()
        };
        Ok(Execution { rows: Box::new(BufferedRows::new(rows)), warnings: Vec::new() })
    }
}

fn server(log: &Log, config: Arc<InMemoryConfig>, role: Box<dyn Role>) -> Server {
    Server::builder("db1", Credential::new("root", ""), Credential::new("mysql", ""), Arc::new(LoggingMachine(log.clone())))
        .connector(Arc::new(FixedConnector(log.clone())))
        .config_manager(config)
        .runner(Arc::new(SilentRunner))
        .server_id(1)
        .role(role)
        .build()
        .unwrap()
}

fn empty_config() -> Arc<InMemoryConfig> {
    Arc::new(InMemoryConfig(Mutex::new(OptionFile::parse("[mysqld]\n").unwrap())))
}

#[test]
fn integration_connection_is_reused_until_disconnect() {
    let log = Log::default();
    let mut server = server(&log, empty_config(), Box::new(Slave));
    log.lock().unwrap().clear();

    server.connect("").unwrap().connect("").unwrap();
    server.execute("SELECT 1", Params::None, "test").unwrap();
    server.disconnect().start().unwrap().sql("SELECT 2").unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["connect", "use test", "SELECT 1", "start db1", "connect", "SELECT 2"]);
}

#[test]
fn integration_empty_result() {
    let log = Log::default();
    let mut server = server(&log, empty_config(), Box::new(Slave));
    let mut result = server.sql("SHOW SLAVE STATUS").unwrap();
    assert!(result.next_row().unwrap().is_none());
    assert!(matches!(result.get("Slave_IO_Running"), Err(ServerError::EmptyRow)));
}

#[test]
fn integration_promote_slave_to_master() {
    let log = Log::default();
    let config = empty_config();
    let mut server = server(&log, config.clone(), Box::new(Slave));
    assert_eq!(config.0.lock().unwrap().get("mysqld", "relay-log"), Some("db1-relay-bin"));

    server.imbue(Box::new(Master::new(Credential::new("repl", "xyzzy")))).unwrap();
    let promoted = config.0.lock().unwrap().clone();
    assert_eq!(promoted.get("mysqld", "relay-log"), None);
    assert_eq!(promoted.get("mysqld", "log-bin"), Some("db1-bin"));
    assert_eq!(promoted.get("mysqld", "server-id"), Some("1"));
    assert_eq!(server.role().name(), "master");

    let position = server.binlog_position().unwrap().unwrap();
    assert_eq!(position, Position::new("db1-bin.000001", 4711));
    assert!(position < Position::new("db1-bin.000002", 4));
}
