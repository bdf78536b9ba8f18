//! Test helpers for bfctl's behavioral specifications.
//!
//! Black-box: every spec invokes the `bfctl` binary and inspects stdout,
//! stderr, and the exit code rather than calling library code directly.

#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::process::{Command, Output};

pub fn bfctl_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin("bfctl"))
}

pub struct CliBuilder {
    cmd: Command,
}

pub fn cli() -> CliBuilder {
    CliBuilder { cmd: bfctl_cmd() }
}

impl CliBuilder {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn run(mut self) -> CliOutput {
        let output = self.cmd.output().expect("bfctl must spawn");
        CliOutput { output }
    }

    pub fn passes(self) -> CliOutput {
        let result = self.run();
        assert!(
            result.output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            result.output.status,
            result.stdout(),
            result.stderr()
        );
        result
    }

    pub fn fails(self) -> CliOutput {
        let result = self.run();
        assert!(
            !result.output.status.success(),
            "expected failure, got success\nstdout: {}",
            result.stdout()
        );
        result
    }
}

pub struct CliOutput {
    output: Output,
}

impl CliOutput {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    #[track_caller]
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout().contains(needle),
            "expected stdout to contain {needle:?}, got: {}",
            self.stdout()
        );
        self
    }

    #[track_caller]
    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout().contains(needle),
            "expected stdout NOT to contain {needle:?}, got: {}",
            self.stdout()
        );
        self
    }

    /// Parse stdout as a back-to-back stream of pretty-printed JSON objects,
    /// the shape `bfctl demo` prints (one object per lifecycle step).
    pub fn json_steps(&self) -> Vec<serde_json::Value> {
        serde_json::Deserializer::from_str(&self.stdout())
            .into_iter::<serde_json::Value>()
            .collect::<Result<Vec<_>, _>>()
            .expect("bfctl stdout must be a stream of JSON objects")
    }

    /// The `result` field of the step named `step`, or `None` if absent.
    pub fn step_result(&self, step: &str) -> Option<serde_json::Value> {
        self.json_steps()
            .into_iter()
            .find(|value| value["step"] == step)
            .map(|value| value["result"].clone())
    }

    /// Parse stdout as a single JSON object, the shape `bfctl create`/
    /// `bfctl health` print.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).expect("bfctl stdout must be a single JSON object")
    }
}
