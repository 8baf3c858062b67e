//! The impls and functions.
//!
use std::{fmt, path::{Path, PathBuf}, sync::Arc};
use log::*;
use anyhow::anyhow;
use itertools::Itertools;
use crate::configmanager::{ConfigManager, FileConfigManager, OptionFile};
use crate::cursor::ResultCursor;
use crate::driver::{ConnectOptions, Connection, Connector, MysqlConnector, Params};
use crate::error::{Result, ServerError};
use crate::machine::Machine;
use crate::position::Position;
use crate::remote::{CommandRunner, ProcessRunner};
use crate::roles::{Role, Vagabond};
use crate::server::{Credential, Server, ServerBuilder};

pub const LOCAL_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_SOCKET: &str = "/tmp/mysqld.sock";
pub const DEFAULT_CONFIG_SECTION: &str = "mysqld";

impl Credential {
    pub fn new(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Credential { name: name.into(), secret: secret.into() }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("secret", &"<hidden>")
            .finish()
    }
}

impl ServerBuilder {
    pub fn machine(mut self, machine: Arc<dyn Machine>) -> Self {
        self.machine = machine;
        self
    }
    pub fn config_manager(mut self, config_manager: Arc<dyn ConfigManager>) -> Self {
        self.config_manager = Some(config_manager);
        self
    }
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }
    pub fn role(mut self, role: Box<dyn Role>) -> Self {
        self.role = Some(role);
        self
    }
    pub fn server_id(mut self, server_id: u32) -> Self {
        self.server_id = Some(server_id);
        self
    }
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
    pub fn socket(mut self, socket: impl Into<PathBuf>) -> Self {
        self.socket = socket.into();
        self
    }
    pub fn defaults_file(mut self, defaults_file: impl Into<String>) -> Self {
        self.defaults_file = Some(defaults_file.into());
        self
    }
    pub fn config_section(mut self, config_section: impl Into<String>) -> Self {
        self.config_section = config_section.into();
        self
    }
    /// Create the server and attach its role.
    pub fn build(self) -> Result<Server> {
        let defaults_file = self.defaults_file
            .unwrap_or_else(|| self.machine.defaults_file().to_string());
        let role = self.role.unwrap_or_else(|| Box::new(Vagabond));
        let mut server = Server {
            name: self.name,
            sql_user: self.sql_user,
            ssh_user: self.ssh_user,
            host: self.host,
            port: self.port,
            socket: self.socket,
            server_id: self.server_id,
            defaults_file,
            config_section: self.config_section,
            machine: self.machine,
            config_manager: self.config_manager.unwrap_or_else(|| Arc::new(FileConfigManager)),
            connector: self.connector.unwrap_or_else(|| Arc::new(MysqlConnector)),
            runner: self.runner.unwrap_or_else(|| Arc::new(ProcessRunner)),
            role: Box::new(Vagabond),
            connection: None,
        };
        debug!("{}: created, attach {}", server.name, role.name());
        let attached = role.attach(&mut server);
        let to = role.name();
        server.role = role;
        attached.map_err(|source| ServerError::RoleTransition {
            from: "(new)".to_string(),
            to,
            stage: "attach",
            source: Box::new(source),
        })?;
        Ok(server)
    }
}

impl Server {
    pub fn builder(
        name: impl Into<String>,
        sql_user: Credential,
        ssh_user: Credential,
        machine: Arc<dyn Machine>,
    ) -> ServerBuilder
    {
        ServerBuilder {
            name: name.into(),
            sql_user,
            ssh_user,
            machine,
            config_manager: None,
            connector: None,
            runner: None,
            role: None,
            server_id: None,
            host: LOCAL_HOST.to_string(),
            port: DEFAULT_PORT,
            socket: PathBuf::from(DEFAULT_SOCKET),
            defaults_file: None,
            config_section: DEFAULT_CONFIG_SECTION.to_string(),
        }
    }
    pub fn is_local(&self) -> bool {
        self.host == LOCAL_HOST
    }
    pub fn hostname_port(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
    pub fn connect_options(&self, database: &str) -> ConnectOptions {
        ConnectOptions {
            host: self.host.clone(),
            port: self.port,
            socket: self.is_local().then(|| self.socket.clone()),
            database: database.to_string(),
            credential: self.sql_user.clone(),
        }
    }
    /// Return the open connection, opening it if there is none.
    /// A non-empty `database` on a reused connection switches its default database.
    fn ensure_connection(&mut self, database: &str) -> Result<&mut dyn Connection> {
        let (connection, reused) = match self.connection.take() {
            Some(connection) => (connection, true),
            None => {
                let options = self.connect_options(database);
                info!("{}: connect to {}", self.name, options.endpoint());
                let connection = self.connector.connect(&options)
                    .map_err(ServerError::Connection)?;
                (connection, false)
            },
        };
        let connection = self.connection.insert(connection);
        if reused && !database.is_empty() {
            debug!("{}: use database {}", self.name, database);
            connection.select_database(database)
                .map_err(ServerError::Connection)?;
        }
        Ok(connection.as_mut())
    }
    pub fn connect(&mut self, database: &str) -> Result<&mut Self> {
        self.ensure_connection(database)?;
        Ok(self)
    }
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
    /// Drop the connection. The next execution connects again.
    pub fn disconnect(&mut self) -> &mut Self {
        if self.connection.take().is_some() {
            debug!("{}: disconnected", self.name);
        }
        self
    }
    /// Execute a statement, connecting first when needed.
    ///
    /// The warnings of the statement are logged and returned on the cursor.
    pub fn execute(
        &mut self,
        command: &str,
        params: Params,
        database: &str,
    ) -> Result<ResultCursor>
    {
        let connection = self.ensure_connection(database)?;
        let execution = connection.execute(command, &params)
            .map_err(ServerError::Connection)?;
        for warning in &execution.warnings {
            warn!("{}: {} {} ({}): {}", self.name, warning.level, warning.code, command, warning.message);
        }
        ResultCursor::new(execution.rows, execution.warnings)
    }
    /// Execute a statement without parameters in the current database.
    pub fn sql(&mut self, command: &str) -> Result<ResultCursor> {
        self.execute(command, Params::None, "")
    }
    /// The argument vector that runs `command` on the machine of the server:
    /// through sudo as the ssh user for the local host, through ssh otherwise.
    pub fn remote_argv<S: AsRef<str>>(&self, command: &[S]) -> Vec<String> {
        if self.is_local() {
            ["sudo", "-u", self.ssh_user.name.as_str()].iter()
                .map(|part| part.to_string())
                .chain(command.iter().map(|part| part.as_ref().to_string()))
                .collect()
        } else {
            vec![
                "ssh".to_string(),
                // quiet, no tty, no X11 forwarding, stdin from /dev/null
                "-q".to_string(),
                "-T".to_string(),
                "-x".to_string(),
                "-n".to_string(),
                format!("{}@{}", self.ssh_user.name, self.host),
                command.iter().map(AsRef::as_ref).join(" "),
            ]
        }
    }
    /// Run a shell command on the machine of the server and return its output lines.
    /// This blocks until the command exits; there is no timeout.
    pub fn run_remote_command<S: AsRef<str>>(&self, command: &[S]) -> Result<Vec<String>> {
        let argv = self.remote_argv(command);
        debug!("{}: run {:?}", self.name, argv);
        self.runner.run(&argv)
            .map_err(|source| ServerError::Remote { command: argv, source })
    }
    pub fn fetch_config(&self, path: Option<&Path>) -> Result<OptionFile> {
        self.config_manager.fetch_config(self, path)
            .map_err(ServerError::Config)
    }
    pub fn replace_config(&mut self, config: &OptionFile, path: Option<&Path>) -> Result<&mut Self> {
        self.config_manager.replace_config(self, config, path)
            .map_err(ServerError::Config)?;
        Ok(self)
    }
    pub fn start(&mut self) -> Result<&mut Self> {
        self.machine.start_server(self)
            .map_err(ServerError::Machine)?;
        Ok(self)
    }
    pub fn stop(&mut self) -> Result<&mut Self> {
        self.machine.stop_server(self)
            .map_err(ServerError::Machine)?;
        Ok(self)
    }
    /// The server id: the one given at construction, or `server-id` in the option file.
    pub fn resolve_server_id(&self) -> Result<Option<u32>> {
        if let Some(server_id) = self.server_id {
            return Ok(Some(server_id));
        }
        let config = self.fetch_config(None)?;
        config.get(&self.config_section, "server-id")
            .map(|value| value.parse::<u32>()
                .map_err(|_| ServerError::Config(anyhow!("{}: invalid server-id: {}", self.name, value))))
            .transpose()
    }
    /// The current binlog position, `None` when binary logging is disabled.
    pub fn binlog_position(&mut self) -> Result<Option<Position>> {
        let result = self.sql("SHOW MASTER STATUS")?;
        result.current()
            .map(Position::from_row)
            .transpose()
    }
    /// Replace the role of the server: detach the current role, then attach `role`.
    ///
    /// This always runs in full, also when `role` is the same kind of role as the
    /// current one. When detaching fails the current role stays in place and `role`
    /// is not attached. When attaching fails `role` is kept, but the server should be
    /// considered to be in an undefined state.
    pub fn imbue(&mut self, role: Box<dyn Role>) -> Result<()> {
        let from = self.role.name();
        let to = role.name();
        info!("{}: imbue {} -> {}", self.name, from, to);

        let old = std::mem::replace(&mut self.role, Box::new(Vagabond));
        if let Err(source) = old.detach(self) {
            self.role = old;
            return Err(ServerError::RoleTransition { from, to, stage: "detach", source: Box::new(source) });
        }
        let attached = role.attach(self);
        self.role = role;
        attached.map_err(|source| ServerError::RoleTransition { from, to, stage: "attach", source: Box::new(source) })
    }
    pub fn role(&self) -> &dyn Role {
        self.role.as_ref()
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("socket", &self.socket)
            .field("server_id", &self.server_id)
            .field("defaults_file", &self.defaults_file)
            .field("config_section", &self.config_section)
            .field("role", &self.role.name())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
