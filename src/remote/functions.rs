//! The impls and functions.
//!
use std::{io::{self, Read}, process::{Command, Stdio}, time::Instant};
use log::*;
use crate::remote::{CommandRunner, ProcessRunner};

/// Split output on line boundaries. A trailing newline does not produce an empty last line.
pub fn split_lines(output: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(output)
        .lines()
        .map(str::to_string)
        .collect()
}

impl CommandRunner for ProcessRunner {
    fn run(&self, argv: &[String]) -> io::Result<Vec<String>> {
        let (program, arguments) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        debug!("run: {:?}", argv);
        let timer = Instant::now();
        // stdout and stderr share one pipe, so lines keep the order they were written in.
        let (mut reader, writer) = io::pipe()?;
        let mut child = {
            let mut command = Command::new(program);
            command
                .args(arguments)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command.spawn()?
        };
        let mut output = Vec::new();
        reader.read_to_end(&mut output)?;
        let status = child.wait()?;
        let lines = split_lines(&output);
        debug!("{} exited with {} after {:?}, {} lines", program, status, timer.elapsed(), lines.len());
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_split_lines_drops_trailing_newline() {
        assert_eq!(split_lines(b"one\ntwo\n"), vec!["one", "two"]);
        assert_eq!(split_lines(b"one\r\ntwo"), vec!["one", "two"]);
        assert!(split_lines(b"").is_empty());
    }

    #[test]
    fn unit_empty_command_is_rejected() {
        let result = ProcessRunner.run(&[]);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn unit_process_output_is_captured() {
        let argv = vec!["sh".to_string(), "-c".to_string(), "echo out; echo err >&2".to_string()];
        let lines = ProcessRunner.run(&argv).unwrap();
        assert_eq!(lines, vec!["out", "err"]);
    }

    #[cfg(unix)]
    #[test]
    fn unit_process_output_keeps_write_order() {
        let argv = vec!["sh".to_string(), "-c".to_string(), "echo first >&2; sleep 0.1; echo second; echo third >&2".to_string()];
        let lines = ProcessRunner.run(&argv).unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }
}
