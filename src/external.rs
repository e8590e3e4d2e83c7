//! Wrapper around the authoritative `alloy` command-line tool.
//!
//! Each invocation stages the configuration in its own temporary file. The
//! file lives exactly as long as the invocation future: it is removed on
//! success, failure, timeout, or when the future is dropped mid-flight. The
//! child process is killed when its future is dropped.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::error::{Error, Result};

pub const DEFAULT_PROGRAM: &str = "alloy";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How to reach the external compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCompiler {
    program: PathBuf,
    timeout: Duration,
}

impl Default for ExternalCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_TIMEOUT)
    }
}

/// Result of `alloy validate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolVerdict {
    Passed,
    Failed { status: String, stderr: String },
}

impl ExternalCompiler {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Locate the executable now. `None` means the tool is unavailable,
    /// which is not an error.
    pub fn locate(&self) -> Option<PathBuf> {
        find_executable(&self.program)
    }

    /// Run `alloy validate [--stability.level=<level>] <file>`.
    pub async fn validate(
        &self,
        executable: &Path,
        config: &str,
        stability_level: Option<&str>,
    ) -> Result<ToolVerdict> {
        let mut args = Vec::new();
        if let Some(level) = stability_level.filter(|l| !l.is_empty()) {
            args.push(format!("--stability.level={}", level));
        }

        let output = self.run(executable, "validate", &args, config).await?;
        if output.status.success() {
            Ok(ToolVerdict::Passed)
        } else {
            Ok(ToolVerdict::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    /// Run `alloy fmt <file>` and return the formatted text.
    pub async fn format(&self, executable: &Path, config: &str) -> Result<String> {
        let output = self.run(executable, "fmt", &[], config).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(Error::ExternalTool {
                command: "fmt",
                message,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn run(
        &self,
        executable: &Path,
        command: &'static str,
        args: &[String],
        config: &str,
    ) -> Result<Output> {
        // Dropped at the end of this function, or with the future.
        let staged = stage(config)?;

        let child = Command::new(executable)
            .arg(command)
            .args(args)
            .arg(staged.path())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        log::debug!(
            "Running {} {} on {}",
            executable.display(),
            command,
            staged.path().display()
        );

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(Error::ExternalTool {
                command,
                message: format!("failed to run {}: {}", executable.display(), e),
            }),
            Err(_) => {
                log::warn!(
                    "alloy {} exceeded {}ms, killing it",
                    command,
                    self.timeout.as_millis()
                );
                Err(Error::Timeout {
                    command,
                    after: self.timeout,
                })
            }
        }
    }
}

fn stage(config: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("config-")
        .suffix(".alloy")
        .tempfile()
        .map_err(|source| Error::Resource { source })?;
    file.write_all(config.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| Error::Resource { source })?;
    Ok(file)
}

/// Resolve `program` the way a shell would: paths are checked directly,
/// bare names are searched for on `PATH`.
pub fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .flat_map(|dir| candidates(&dir.join(program)))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn candidates(path: &Path) -> Vec<PathBuf> {
    vec![path.to_path_buf()]
}

#[cfg(not(unix))]
fn candidates(path: &Path) -> Vec<PathBuf> {
    vec![path.to_path_buf(), path.with_extension("exe")]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
