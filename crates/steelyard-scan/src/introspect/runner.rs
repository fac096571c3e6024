//! Out-of-process tool execution with a bounded wait.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, trace};

use super::error::IntrospectionError;

/// Runs external tools to completion and captures their stdout.
///
/// Owns a small tokio runtime so the synchronous builder can call it from
/// any worker thread.
pub struct ToolRunner {
    runtime: Runtime,
    timeout: Duration,
}

impl ToolRunner {
    /// Create a runner that kills tools running longer than `timeout`.
    pub fn new(timeout: Duration) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("steelyard-tools")
            .enable_io()
            .enable_time()
            .build()?;
        Ok(Self { runtime, timeout })
    }

    /// The bounded wait applied to each invocation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program` with `args` and return its stdout.
    ///
    /// The exit wait and the stdout drain run concurrently so a tool filling
    /// its pipe cannot stall.
    pub fn run<I, S>(&self, program: &Path, args: I) -> Result<Vec<u8>, IntrospectionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!(program = %program.display(), "running tool");
        self.runtime
            .block_on(run_to_completion(command, program.to_path_buf(), self.timeout))
    }
}

async fn run_to_completion(
    mut command: Command,
    program: PathBuf,
    timeout: Duration,
) -> Result<Vec<u8>, IntrospectionError> {
    let mut child = command
        .spawn()
        .map_err(|source| IntrospectionError::spawn(&program, source))?;

    let mut stdout = child.stdout.take().ok_or_else(|| IntrospectionError::Io {
        program: program.clone(),
        source: std::io::Error::other("stdout was not captured"),
    })?;

    let drain = async {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await?;
        Ok::<_, std::io::Error>(buf)
    };

    let joined = tokio::time::timeout(timeout, async { tokio::try_join!(child.wait(), drain) })
        .await
        .map_err(|_| IntrospectionError::TimedOut {
            program: program.clone(),
            timeout,
        })?;

    let (status, output) = joined.map_err(|source| IntrospectionError::Io {
        program: program.clone(),
        source,
    })?;

    trace!(program = %program.display(), bytes = output.len(), %status, "tool finished");

    if !status.success() {
        return Err(IntrospectionError::NonZeroExit { program, status });
    }
    Ok(output)
}
