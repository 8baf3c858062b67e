//! replicant: control the MySQL servers of a replication deployment from the command line.
//!
//! Hosts, port, users and parallelism are taken from the command line, then from
//! `REPLICANT_*` variables in the environment or `.env`, then from defaults.
//! `--write-dotenv` saves the settings that were given to `.env`.
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use dotenv::dotenv;
use itertools::Itertools;
use log::*;
use mysql_replicant::{Credential, Position, Server, ServerError, DEFAULT_SQL_USER, DEFAULT_SSH_USER};
use mysql_replicant::machine::{Linux, Machine, Solaris};
use mysql_replicant::position::StoredPosition;
use mysql_replicant::roles::{Master, Role, Slave, Vagabond};
use mysql_replicant::server::{DEFAULT_CONFIG_SECTION, DEFAULT_PORT, DEFAULT_SOCKET};
use mysql_replicant::utility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MachineKind {
    Linux,
    Solaris,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RoleKind {
    Vagabond,
    Master,
    Slave,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Opts {
    /// hostnames (comma separated), localhost connects through the socket
    #[arg(short = 'H', long, value_name = "hostname,hostname")]
    hosts: Option<String>,
    #[arg(short, long, value_name = "port")]
    port: Option<String>,
    #[arg(long, value_name = "path")]
    socket: Option<String>,
    /// server name, used for binlog and relay log names (default: the hostname)
    #[arg(long)]
    name: Option<String>,
    #[arg(short = 'u', long, value_name = "user")]
    sql_user: Option<String>,
    #[arg(long, value_name = "password")]
    sql_password: Option<String>,
    /// operating system user on the machine of the server
    #[arg(long, value_name = "user")]
    ssh_user: Option<String>,
    #[arg(long, value_enum, default_value_t = MachineKind::Linux)]
    machine: MachineKind,
    /// option file of the server (default: the machine's)
    #[arg(long, value_name = "path")]
    defaults_file: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_SECTION)]
    config_section: String,
    #[arg(long)]
    server_id: Option<u32>,
    /// number of servers read at the same time for --position
    #[arg(long, value_name = "threads")]
    parallel: Option<String>,
    /// execute a statement and print the result
    #[arg(long, value_name = "statement")]
    sql: Option<String>,
    /// run a command on the machine of the server and print the output
    #[arg(long, num_args = 1.., value_name = "command")]
    remote: Option<Vec<String>>,
    #[arg(long)]
    stop: bool,
    /// imbue the server with a role
    #[arg(long, value_enum)]
    role: Option<RoleKind>,
    #[arg(long, value_name = "user", default_value = "repl")]
    repl_user: String,
    #[arg(long, value_name = "password")]
    repl_password: Option<String>,
    #[arg(long)]
    start: bool,
    /// print the binlog position of all hosts
    #[arg(long)]
    position: bool,
    /// append the positions read with --position to this CSV file
    #[arg(long, value_name = "file")]
    position_log: Option<PathBuf>,
    /// print the positions read with --position as JSON
    #[arg(long)]
    json: bool,
    #[arg(long)]
    print_config: bool,
    #[arg(long)]
    write_dotenv: bool,
}

/// The resolved settings every server is built from.
struct Settings {
    port: u16,
    socket: String,
    sql_user: Credential,
    ssh_user: Credential,
    machine: Arc<dyn Machine>,
}

impl Settings {
    fn build_server(&self, options: &Opts, host: &str) -> Result<Server> {
        let name = options.name.clone().unwrap_or_else(|| host.to_string());
        let mut builder = Server::builder(name, self.sql_user.clone(), self.ssh_user.clone(), self.machine.clone())
            .host(host)
            .port(self.port)
            .socket(self.socket.as_str())
            .config_section(options.config_section.as_str());
        if let Some(defaults_file) = &options.defaults_file {
            builder = builder.defaults_file(defaults_file.as_str());
        }
        if let Some(server_id) = options.server_id {
            builder = builder.server_id(server_id);
        }
        builder.build()
            .with_context(|| format!("Error creating server {}", host))
    }
}

fn role_for(options: &Opts, kind: RoleKind) -> Box<dyn Role> {
    match kind {
        RoleKind::Vagabond => Box::new(Vagabond),
        RoleKind::Master => Box::new(Master::new(Credential::new(
            options.repl_user.as_str(),
            utility::set_secret(&options.repl_password, "REPLICANT_REPL_PASSWORD"),
        ))),
        RoleKind::Slave => Box::new(Slave),
    }
}

fn print_positions(options: &Opts, settings: &Settings, hosts: &[String], parallel: usize) -> Result<()> {
    let servers = hosts.iter()
        .map(|host| settings.build_server(options, host))
        .collect::<Result<Vec<_>>>()?;
    let positions = utility::read_positions(servers, parallel)?;
    let highest = utility::highest_position(&positions).cloned();

    let stored: Vec<StoredPosition> = positions.iter()
        .filter_map(|(hostname_port, result)| match result {
            Ok(Some(position)) => Some(StoredPosition::new(hostname_port, position)),
            _ => None,
        })
        .collect();
    if options.json {
        println!("{}", serde_json::to_string_pretty(&stored).with_context(|| "Error serializing positions")?);
    } else {
        for (hostname_port, result) in &positions {
            print_position(hostname_port, result, highest.as_ref());
        }
    }
    if let Some(path) = &options.position_log {
        StoredPosition::append_to_log(path, &stored)?;
    }
    Ok(())
}

fn print_position(hostname_port: &str, result: &Result<Option<Position>, ServerError>, highest: Option<&Position>) {
    match result {
        Ok(Some(position)) if Some(position) == highest => println!("{:30} {}", hostname_port, position.to_string().green()),
        Ok(Some(position)) => println!("{:30} {}", hostname_port, position.to_string().yellow()),
        Ok(None) => println!("{:30} {}", hostname_port, "binary log disabled".dimmed()),
        Err(error) => println!("{:30} {}", hostname_port, error.to_string().red()),
    }
}

fn run_server(options: &Opts, settings: &Settings, host: &str) -> Result<()> {
    let mut server = settings.build_server(options, host)?;
    debug!("{:?}", server);

    if options.stop {
        server.stop()?;
    }
    if let Some(kind) = options.role {
        server.imbue(role_for(options, kind))?;
    }
    if options.start {
        server.start()?;
    }
    if let Some(statement) = &options.sql {
        let mut result = server.sql(statement)?;
        if let Some(row) = result.current() {
            println!("{}", row.column_names().join("\t").bold());
        }
        for warning in result.warnings() {
            println!("{}", format!("{} {}: {}", warning.level, warning.code, warning.message).yellow());
        }
        while let Some(row) = result.next_row()? {
            println!("{}", row.iter().map(|(_, value)| value).join("\t"));
        }
    }
    if let Some(command) = &options.remote {
        for line in server.run_remote_command(command)? {
            println!("{}", line);
        }
    }
    if options.print_config {
        let config = server.fetch_config(None)?;
        print!("{}", config);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    dotenv().ok();
    let options = Opts::parse();

    let mut changed_options = HashMap::new();
    let hosts = utility::set_hosts(&options.hosts, &mut changed_options);
    let port = utility::set_option(&options.port, "REPLICANT_PORT", &DEFAULT_PORT.to_string(), &mut changed_options);
    let socket = utility::set_option(&options.socket, "REPLICANT_SOCKET", DEFAULT_SOCKET, &mut changed_options);
    let sql_user = utility::set_option(&options.sql_user, "REPLICANT_SQL_USER", DEFAULT_SQL_USER, &mut changed_options);
    let ssh_user = utility::set_option(&options.ssh_user, "REPLICANT_SSH_USER", DEFAULT_SSH_USER, &mut changed_options);
    let parallel = utility::set_parallel(&options.parallel, &mut changed_options)?;
    utility::dotenv_writer(options.write_dotenv, changed_options)?;

    let settings = Settings {
        port: port.parse().with_context(|| format!("Invalid port: {}", port))?,
        socket,
        sql_user: Credential::new(sql_user, utility::set_secret(&options.sql_password, "REPLICANT_SQL_PASSWORD")),
        ssh_user: Credential::new(ssh_user, ""),
        machine: match options.machine {
            MachineKind::Linux => Arc::new(Linux::default()),
            MachineKind::Solaris => Arc::new(Solaris::default()),
        },
    };

    if options.position {
        return print_positions(&options, &settings, &hosts, parallel);
    }
    for host in &hosts {
        info!("{}", host);
        run_server(&options, &settings, host)?;
    }
    Ok(())
}
