//! Launching the tool assigned to a referenced file.

use std::process::Stdio;

use tokio::process::Command;
use tokio::runtime::Handle;

/// Starts an external program without waiting for it.
pub trait ProcessLauncher: Send + Sync {
    /// Starts `command` with `argument` as its only argument.
    fn launch(&self, command: &str, argument: &str) -> std::io::Result<()>;
}

/// Launches real processes on the current tokio runtime.
///
/// The child handle is dropped right away; tokio reaps the exited process in
/// the background, so nothing lingers as a zombie.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, command: &str, argument: &str) -> std::io::Result<()> {
        // Child processes need the runtime's process driver
        let _runtime = Handle::try_current().map_err(std::io::Error::other)?;

        let child = Command::new(command)
            .arg(argument)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        tracing::debug!(command, argument, pid = ?child.id(), "Launched tool");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let result = SystemLauncher.launch("wordlight-no-such-program", "file.txt");
        assert!(result.is_err());
    }

    #[test]
    fn test_no_runtime_is_an_error() {
        let result = SystemLauncher.launch("true", "file.txt");
        assert!(result.is_err());
    }
}
