//! Utilities
use log::*;
use std::{collections::HashMap, env, fs, io::Write, sync::mpsc::channel, time::Instant};
use anyhow::{Context, Result};
use crate::error::ServerError;
use crate::position::Position;
use crate::server::Server;
use crate::{DEFAULT_HOSTS, DEFAULT_PARALLEL};

/// Resolve a setting: the command line option if given, otherwise the environment
/// variable (set via `.env`), otherwise the default.
///
/// Settings that were given or found in the environment are recorded in
/// `changed_options`, so they can be written to `.env`.
pub fn set_option(
    option: &Option<String>,
    variable: &'static str,
    default: &str,
    changed_options: &mut HashMap<&'static str, String>,
) -> String
{
    match option {
        Some(value) => {
            info!("{} argument set: using: {}", variable, value);
            changed_options.insert(variable, value.to_string());
            value.to_string()
        },
        None => match env::var(variable) {
            Ok(set_var) => {
                info!("{} not set: set via .env: {}", variable, set_var);
                changed_options.insert(variable, set_var.to_owned());
                set_var
            },
            Err(_e) => {
                info!("{} not set: and not set via .env: using default: {}", variable, default);
                default.to_string()
            },
        },
    }
}

/// Resolve a secret like [set_option], without recording it for `.env`.
pub fn set_secret(
    option: &Option<String>,
    variable: &'static str,
) -> String
{
    option.clone()
        .or_else(|| env::var(variable).ok())
        .unwrap_or_default()
}

pub fn set_hosts(
    option: &Option<String>,
    changed_options: &mut HashMap<&'static str, String>,
) -> Vec<String>
{
    set_option(option, "REPLICANT_HOSTS", DEFAULT_HOSTS, changed_options)
        .split(',')
        .map(|host| host.trim().to_string())
        .filter(|host| !host.is_empty())
        .collect()
}

pub fn set_parallel(
    option: &Option<String>,
    changed_options: &mut HashMap<&'static str, String>,
) -> Result<usize>
{
    let parallel = set_option(option, "REPLICANT_PARALLEL", DEFAULT_PARALLEL, changed_options);
    parallel.parse::<usize>()
        .with_context(|| format!("Invalid parallel setting: {}", parallel))
}

pub fn dotenv_writer(
    write_dotenv: bool,
    changed_options: HashMap<&str, String>,
) -> Result<()>
{
    if !changed_options.is_empty() && write_dotenv {
        info!("Writing .env file");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(".env")
            .with_context(|| "Error writing .env file: .env")?;

        let mut keys: Vec<&&str> = changed_options.keys().collect();
        keys.sort();
        for key in keys {
            file.write_all(format!("{}={}\n", key, changed_options[*key]).as_bytes())?;
            info!("{}={}", key, changed_options[*key]);
        }
    }
    Ok(())
}

/// The binlog position read from one server.
pub type PositionResult = (String, Result<Option<Position>, ServerError>);

/// Read the binlog positions of `servers`, `parallel` servers at a time.
///
/// Every server is driven by one worker; the servers share nothing but their
/// collaborators. The results are sorted by hostname_port.
pub fn read_positions(
    servers: Vec<Server>,
    parallel: usize,
) -> Result<Vec<PositionResult>>
{
    info!("begin parallel position read");
    let timer = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallel)
        .build()
        .with_context(|| "Error creating thread pool")?;
    let (tx, rx) = channel();
    pool.scope(move |s| {
        for mut server in servers {
            let tx = tx.clone();
            s.spawn(move |_| {
                let position = server.binlog_position();
                debug!("{}: {:?}", server.hostname_port(), position);
                // the receiver outlives the scope
                let _ = tx.send((server.hostname_port(), position));
            });
        }
    });

    info!("end parallel position read {:?}", timer.elapsed());

    let mut positions: Vec<PositionResult> = rx.iter().collect();
    positions.sort_by(|left, right| left.0.cmp(&right.0));
    Ok(positions)
}

/// The most advanced position among the results.
pub fn highest_position(
    positions: &[PositionResult],
) -> Option<&Position>
{
    positions.iter()
        .filter_map(|(_, result)| result.as_ref().ok().and_then(Option::as_ref))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::cursor::{Row, Value};
    use crate::utility_test::{MockConnector, RecordingRunner, test_server};

    fn server_at(host: &str, file: &str, position: &str) -> Server {
        let connector = Arc::new(MockConnector::default());
        connector.respond("SHOW MASTER STATUS", vec![Row::new(vec![
            ("File".to_string(), Value::from(file)),
            ("Position".to_string(), Value::from(position)),
        ])]);
        test_server(Arc::new(RecordingRunner::default()))
            .host(host)
            .connector(connector)
            .build()
            .unwrap()
    }

    #[test]
    fn unit_set_option_prefers_argument() {
        let mut changed_options = HashMap::new();
        let value = set_option(&Some("db1,db2".to_string()), "REPLICANT_TEST_ARGUMENT", "localhost", &mut changed_options);
        assert_eq!(value, "db1,db2");
        assert_eq!(changed_options.get("REPLICANT_TEST_ARGUMENT").map(String::as_str), Some("db1,db2"));
    }

    #[test]
    fn unit_set_option_falls_back_to_default() {
        let mut changed_options = HashMap::new();
        let value = set_option(&None, "REPLICANT_TEST_SURELY_UNSET", "3306", &mut changed_options);
        assert_eq!(value, "3306");
        assert!(changed_options.is_empty());
    }

    #[test]
    fn unit_set_hosts_splits_and_trims() {
        let mut changed_options = HashMap::new();
        let hosts = set_hosts(&Some("db1, db2,,db3".to_string()), &mut changed_options);
        assert_eq!(hosts, vec!["db1", "db2", "db3"]);
    }

    #[test]
    fn unit_set_parallel_rejects_garbage() {
        let mut changed_options = HashMap::new();
        assert_eq!(set_parallel(&Some("4".to_string()), &mut changed_options).unwrap(), 4);
        assert!(set_parallel(&Some("four".to_string()), &mut changed_options).is_err());
    }

    #[test]
    fn unit_read_positions_in_parallel() {
        let servers = vec![
            server_at("db2", "db2-bin.000001", "4711"),
            server_at("db1", "db1-bin.000002", "102"),
            server_at("db3", "db1-bin.000001", "9393"),
        ];
        let positions = read_positions(servers, 2).unwrap();
        let hosts: Vec<&str> = positions.iter().map(|(host, _)| host.as_str()).collect();
        assert_eq!(hosts, vec!["db1:3306", "db2:3306", "db3:3306"]);
        assert_eq!(highest_position(&positions), Some(&Position::new("db2-bin.000001", 4711)));
    }
}
