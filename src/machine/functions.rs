//! The impls and functions.
//!
use log::*;
use anyhow::{Context, Result};
use crate::machine::{Linux, Machine, Solaris};
use crate::server::Server;

pub const DEFAULT_DEFAULTS_FILE: &str = "/etc/mysql/my.cnf";

impl Default for Linux {
    fn default() -> Self {
        Linux {
            init_script: "/etc/init.d/mysql".to_string(),
            defaults_file: DEFAULT_DEFAULTS_FILE.to_string(),
        }
    }
}
impl Default for Solaris {
    fn default() -> Self {
        Solaris {
            service: "mysql".to_string(),
            defaults_file: DEFAULT_DEFAULTS_FILE.to_string(),
        }
    }
}

/// Run a control command for `server` and log what it printed.
fn control(server: &Server, command: &[&str]) -> Result<()> {
    let output = server.run_remote_command(command)
        .with_context(|| format!("Error running {:?} for {}", command, server.name))?;
    for line in output {
        debug!("{}: {}", server.name, line);
    }
    Ok(())
}

impl Machine for Linux {
    fn defaults_file(&self) -> &str {
        &self.defaults_file
    }
    fn start_server(&self, server: &Server) -> Result<()> {
        info!("start {} using {}", server.name, self.init_script);
        control(server, &[self.init_script.as_str(), "start"])
    }
    fn stop_server(&self, server: &Server) -> Result<()> {
        info!("stop {} using {}", server.name, self.init_script);
        control(server, &[self.init_script.as_str(), "stop"])
    }
}

impl Machine for Solaris {
    fn defaults_file(&self) -> &str {
        &self.defaults_file
    }
    fn start_server(&self, server: &Server) -> Result<()> {
        info!("start {} using svcadm {}", server.name, self.service);
        control(server, &["svcadm", "enable", "-t", self.service.as_str()])
    }
    fn stop_server(&self, server: &Server) -> Result<()> {
        info!("stop {} using svcadm {}", server.name, self.service);
        control(server, &["svcadm", "disable", "-t", self.service.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::utility_test::{RecordingRunner, test_server};

    #[test]
    fn unit_linux_uses_init_script_through_sudo() {
        let runner = Arc::new(RecordingRunner::default());
        let mut server = test_server(runner.clone())
            .machine(Arc::new(Linux::default()))
            .build()
            .unwrap();
        server.start().unwrap();
        server.stop().unwrap();
        let commands = runner.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], vec!["sudo", "-u", "mysql", "/etc/init.d/mysql", "start"]);
        assert_eq!(commands[1], vec!["sudo", "-u", "mysql", "/etc/init.d/mysql", "stop"]);
    }

    #[test]
    fn unit_solaris_uses_svcadm_over_ssh() {
        let runner = Arc::new(RecordingRunner::default());
        let mut server = test_server(runner.clone())
            .machine(Arc::new(Solaris::default()))
            .host("db2")
            .build()
            .unwrap();
        server.stop().unwrap();
        let commands = runner.commands();
        assert_eq!(commands[0].last().map(String::as_str), Some("svcadm disable -t mysql"));
        assert_eq!(server.defaults_file, DEFAULT_DEFAULTS_FILE);
    }
}
