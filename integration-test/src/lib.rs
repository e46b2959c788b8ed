//! Test driver for the argtree example programs.
//!
//! Runs a demo binary to completion with:
//! - stdin: /dev/null
//! - stdout and stderr: anonymous temp files, read back after exit

use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, Stdio};

/// One run of an example program.
pub struct Session {
    binary: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl Session {
    pub fn new(binary: &str) -> Session {
        Session {
            binary: binary.to_string(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn args(mut self, args: &[&str]) -> Session {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Session {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Run the program and wait for it.
    pub fn run(self) -> std::io::Result<SessionOutput> {
        let mut stdout = tempfile::tempfile()?;
        let mut stderr = tempfile::tempfile()?;

        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args)
            .env_remove("RUST_LOG")
            .stdin(Stdio::null())
            .stdout(stdout.try_clone()?)
            .stderr(stderr.try_clone()?);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }

        let status = cmd.status()?;

        Ok(SessionOutput {
            code: status.code().unwrap_or(-1),
            stdout: read_back(&mut stdout)?,
            stderr: read_back(&mut stderr)?,
        })
    }
}

fn read_back(file: &mut std::fs::File) -> std::io::Result<String> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).to_string())
}

/// Output captured from a completed session.
pub struct SessionOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl SessionOutput {
    /// Assert the exit code, showing both streams on mismatch.
    pub fn assert_exit(self, expected_code: i32) -> SessionOutput {
        assert_eq!(
            self.code, expected_code,
            "expected exit code {}, got {}\nstdout:\n{}\nstderr:\n{}",
            expected_code, self.code, self.stdout, self.stderr
        );
        self
    }
}
