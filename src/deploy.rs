use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to execute {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("deployment script exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("deployment task did not complete: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutput {
    pub stdout: String,
    pub stderr: String,
}

/// The external executable that performs a deployment.
#[derive(Debug, Clone)]
pub struct DeployScript {
    path: PathBuf,
}

impl DeployScript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the script with no arguments and waits for it to exit.
    ///
    /// The child is driven on its own task, so dropping the returned future
    /// (for instance when the client hangs up) leaves a started deployment
    /// running to completion.
    pub async fn run(&self) -> Result<DeployOutput, DeployError> {
        let path = self.path.clone();
        tokio::spawn(run_script(path)).await?
    }
}

async fn run_script(path: PathBuf) -> Result<DeployOutput, DeployError> {
    let output = Command::new(&path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| DeployError::Spawn {
            path: path.clone(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if !output.status.success() {
        return Err(DeployError::Failed {
            status: output.status,
            stderr,
        });
    }

    Ok(DeployOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;
    use tokio::sync::Mutex;

    use super::*;

    // Writing an executable while another test forks can fail with ETXTBSY.
    static SCRIPTS: Mutex<()> = Mutex::const_new(());

    fn write_script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("deploy.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn captures_output_of_successful_run() {
        let _guard = SCRIPTS.lock().await;
        let dir = TempDir::new().unwrap();
        let script = DeployScript::new(write_script(
            &dir,
            "echo \"pulled $#\"\necho warming caches >&2",
        ));

        let output = script.run().await.unwrap();
        assert_eq!(output.stdout, "pulled 0\n");
        assert_eq!(output.stderr, "warming caches\n");
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let _guard = SCRIPTS.lock().await;
        let dir = TempDir::new().unwrap();
        let script = DeployScript::new(write_script(&dir, "echo boom >&2\nexit 3"));

        match script.run().await {
            Err(DeployError::Failed { status, stderr }) => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "boom\n");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_executable_fails_to_spawn() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.sh");
        let script = DeployScript::new(&missing);

        match script.run().await {
            Err(DeployError::Spawn { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Spawn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_executable_file_fails_to_spawn() {
        let _guard = SCRIPTS.lock().await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deploy.sh");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = DeployScript::new(&path).run().await.unwrap_err();
        assert!(matches!(err, DeployError::Spawn { .. }));
        assert!(err.to_string().starts_with("failed to execute"));
    }
}
