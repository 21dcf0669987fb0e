//! The bundled scoring backend, started with the app and killed on exit.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tauri::{AppHandle, Manager, Runtime};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::CodeliaError;
use crate::settings::AppSettings;

pub const STARTUP_DELAY: Duration = Duration::from_secs(2);
pub const READY_INTERVAL: Duration = Duration::from_secs(1);
pub const READY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn bundled_executable_name() -> &'static str {
    if cfg!(windows) {
        "api.exe"
    } else {
        "api"
    }
}

/// How to start the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl BackendCommand {
    /// A frozen executable runs as-is; a `.py` entry point runs under the
    /// system interpreter from its own directory.
    pub fn for_executable(path: &Path) -> Self {
        let working_dir = path.parent().map(Path::to_path_buf);
        if path.extension().is_some_and(|ext| ext == "py") {
            let python = if cfg!(windows) { "python" } else { "python3" };
            return Self {
                program: PathBuf::from(python),
                args: vec![path.to_string_lossy().to_string()],
                working_dir,
            };
        }
        Self {
            program: path.to_path_buf(),
            args: Vec::new(),
            working_dir,
        }
    }
}

/// User override first, then `<resources>/api/api[.exe]`. `None` means the
/// backend is managed outside the app.
pub fn resolve_backend_command<R: Runtime>(
    app: &AppHandle<R>,
    settings: &AppSettings,
) -> Option<BackendCommand> {
    if let Some(path) = settings.backend_executable.as_deref() {
        let path = Path::new(path);
        if path.exists() {
            return Some(BackendCommand::for_executable(path));
        }
        warn!("Configured backend executable not found: {}", path.display());
    }

    let bundled = app
        .path()
        .resource_dir()
        .ok()?
        .join("api")
        .join(bundled_executable_name());
    if bundled.exists() {
        return Some(BackendCommand::for_executable(&bundled));
    }
    info!("No bundled backend at {}; expecting an external one", bundled.display());
    None
}

/// Handle to the spawned backend, kept in managed state.
#[derive(Debug, Default)]
pub struct BackendProcess {
    child: Mutex<Option<Child>>,
}

impl BackendProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launch(&self, command: &BackendCommand) -> Result<(), CodeliaError> {
        let mut guard = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return Err(CodeliaError::Sidecar("Backend already running".into()));
        }

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            CodeliaError::Sidecar(format!(
                "Failed to start {}: {}",
                command.program.display(),
                e
            ))
        })?;
        info!("Started backend (pid {}): {}", child.id(), command.program.display());

        if let Some(stdout) = child.stdout.take() {
            forward_output(stdout, false);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(stderr, true);
        }
        *guard = Some(child);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        let mut guard = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                warn!("Backend exited with {}", status);
                *guard = None;
                false
            }
            Some(Err(e)) => {
                warn!("Failed to query backend process: {}", e);
                false
            }
            None => false,
        }
    }

    pub fn stop(&self) {
        let child = self
            .child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut child) = child {
            info!("Stopping backend (pid {})", child.id());
            if let Err(e) = child.kill() {
                warn!("Failed to kill backend: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Drop for BackendProcess {
    fn drop(&mut self) {
        self.stop();
    }
}

fn forward_output<S: Read + Send + 'static>(stream: S, is_stderr: bool) {
    std::thread::spawn(move || {
        for line in BufReader::new(stream).lines().map_while(Result::ok) {
            if is_stderr {
                warn!(target: "backend", "{}", line);
            } else {
                info!(target: "backend", "{}", line);
            }
        }
    });
}

/// Wait `STARTUP_DELAY`, then poll `GET /config` every `READY_INTERVAL`
/// for up to `READY_TIMEOUT`.
pub async fn wait_for_backend(api: &ApiClient) -> bool {
    wait_for_backend_with(api, STARTUP_DELAY, READY_INTERVAL, READY_TIMEOUT).await
}

pub async fn wait_for_backend_with(
    api: &ApiClient,
    initial_delay: Duration,
    interval: Duration,
    timeout: Duration,
) -> bool {
    tokio::time::sleep(initial_delay).await;
    let started = Instant::now();
    loop {
        if api.is_ready(interval).await {
            info!("Backend ready at {}", api.base_url());
            return true;
        }
        if started.elapsed() >= timeout {
            warn!(
                "Backend at {} not ready after {:?}; continuing",
                api.base_url(),
                timeout
            );
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_entry_point_runs_under_interpreter() {
        let cmd = BackendCommand::for_executable(Path::new("/srv/codelia/api.py"));
        assert!(cmd.program.to_string_lossy().starts_with("python"));
        assert_eq!(cmd.args, vec!["/srv/codelia/api.py".to_string()]);
        assert_eq!(cmd.working_dir.as_deref(), Some(Path::new("/srv/codelia")));
    }

    #[test]
    fn test_executable_runs_directly() {
        let cmd = BackendCommand::for_executable(Path::new("/opt/codelia/api/api"));
        assert_eq!(cmd.program, PathBuf::from("/opt/codelia/api/api"));
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_launch_failure_is_reported() {
        let process = BackendProcess::new();
        let cmd = BackendCommand::for_executable(Path::new("/nonexistent/codelia/api"));
        let err = process.launch(&cmd).unwrap_err();
        assert!(matches!(err, CodeliaError::Sidecar(_)));
        assert!(!process.is_running());
    }

    #[tokio::test]
    async fn test_wait_succeeds_when_backend_answers() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/config")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let api = ApiClient::new(&format!("{}/api", server.url())).unwrap();

        let ready = wait_for_backend_with(
            &api,
            Duration::ZERO,
            Duration::from_millis(200),
            Duration::from_secs(1),
        )
        .await;
        assert!(ready);
    }

    #[tokio::test]
    async fn test_wait_gives_up_after_timeout() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/config")
            .with_status(503)
            .expect_at_least(1)
            .create_async()
            .await;
        let api = ApiClient::new(&format!("{}/api", server.url())).unwrap();

        let started = Instant::now();
        let ready = wait_for_backend_with(
            &api,
            Duration::ZERO,
            Duration::from_millis(50),
            Duration::from_millis(200),
        )
        .await;
        assert!(!ready);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
