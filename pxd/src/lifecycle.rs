//! PID file and socket path bookkeeping: single-instance enforcement,
//! stale-state recovery, and cleanup on exit.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UnixStream;
use tokio::time::timeout;

const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{0}")]
    DaemonAlreadyRunning(String),

    #[error("{0}")]
    InvalidPid(String),

    #[error("{0}")]
    RendererUnavailable(String),

    #[error("{0}")]
    Io(String),
}

impl LifecycleError {
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::DaemonAlreadyRunning(_) => "daemon_already_running",
            LifecycleError::InvalidPid(_) => "invalid_pid",
            LifecycleError::RendererUnavailable(_) => "renderer_unavailable",
            LifecycleError::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for LifecycleError {
    fn from(err: std::io::Error) -> Self {
        LifecycleError::Io(err.to_string())
    }
}

/// Reports whether the process identified by `pid` is currently alive.
/// The default implementation sends POSIX signal 0, which performs
/// existence/permission checks without actually signalling the process.
pub fn process_alive(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    if pid <= 0 {
        return false;
    }
    kill(Pid::from_raw(pid), None).is_ok()
}

/// Attempts a best-effort connect to the daemon's Unix socket.
pub async fn dial_socket(socket_path: &Path) -> Result<(), LifecycleError> {
    let connect = UnixStream::connect(socket_path);
    match timeout(DEFAULT_DIAL_TIMEOUT, connect).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(err)) => Err(LifecycleError::Io(err.to_string())),
        Err(_elapsed) => Err(LifecycleError::Io("dial timed out".to_string())),
    }
}

/// Ensures no other daemon owns `pid_path`/`socket_path`, removing stale
/// files along the way. Called once at daemon startup.
///
/// `is_alive` and `dial` are injectable so tests can simulate a live or a
/// stale process without spawning one.
pub async fn ensure_ready<Alive, DialFut, Dial>(
    pid_path: &Path,
    socket_path: &Path,
    is_alive: Alive,
    dial: Dial,
) -> Result<(), LifecycleError>
where
    Alive: Fn(i32) -> bool,
    DialFut: std::future::Future<Output = Result<(), LifecycleError>>,
    Dial: Fn(&Path) -> DialFut,
{
    if pid_path.as_os_str() != "" && pid_path.exists() {
        match read_pid(pid_path) {
            Ok(pid) => {
                if is_alive(pid) {
                    return Err(LifecycleError::DaemonAlreadyRunning(format!(
                        "pid {pid} is still running"
                    )));
                }
                remove_if_exists(pid_path)?;
                remove_if_exists(socket_path)?;
                return Ok(());
            }
            Err(_malformed) => {
                remove_if_exists(pid_path)?;
                remove_if_exists(socket_path)?;
                return Ok(());
            }
        }
    }

    if socket_path.as_os_str() == "" || !socket_path.exists() {
        return Ok(());
    }

    if dial(socket_path).await.is_ok() {
        return Err(LifecycleError::DaemonAlreadyRunning(
            "socket is active".to_string(),
        ));
    }
    remove_if_exists(socket_path)?;
    Ok(())
}

/// Writes `"<pid>\n"` to `pid_path` with mode 0644. A no-op for an empty
/// path; fails for a non-positive PID.
pub fn write_pid(pid_path: &Path, pid: i32) -> Result<(), LifecycleError> {
    use std::os::unix::fs::PermissionsExt;

    if pid_path.as_os_str() == "" {
        return Ok(());
    }
    if pid <= 0 {
        return Err(LifecycleError::InvalidPid("pid must be positive".to_string()));
    }
    std::fs::write(pid_path, format!("{pid}\n"))?;
    std::fs::set_permissions(pid_path, std::fs::Permissions::from_mode(0o644))?;
    Ok(())
}

/// Removes both paths, ignoring "does not exist" errors.
pub fn cleanup(pid_path: &Path, socket_path: &Path) -> Result<(), LifecycleError> {
    remove_if_exists(socket_path)?;
    remove_if_exists(pid_path)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), LifecycleError> {
    if path.as_os_str() == "" {
        return Ok(());
    }
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn read_pid(pid_path: &Path) -> Result<i32, ()> {
    let data = std::fs::read_to_string(pid_path).map_err(|_| ())?;
    let pid: i32 = data.trim().parse().map_err(|_| ())?;
    if pid <= 0 {
        return Err(());
    }
    Ok(pid)
}
