//! The `pxd` daemon and client. `main.rs` is a thin wrapper around
//! [`run_client_command`], [`run_daemon`] and [`run_start`]; integration
//! tests drive the server/handler directly through this crate.

pub mod cli;
pub mod client;
pub mod handler;
pub mod lifecycle;
pub mod render_sink;
pub mod runtime;
pub mod server;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{self, eyre, WrapErr};
use pxd_core::canvas::Canvas;
use pxd_core::history::History;
use tokio::sync::Mutex;

use cli::StartArgs;
use handler::Handler;
use lifecycle::LifecycleError;
use render_sink::{NullRenderSink, RenderSink};
use runtime::{Runtime, Stopper};
use server::Server;

pub const START_POLL_DEADLINE: Duration = Duration::from_secs(2);
pub const START_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Sends one request line, prints the response, and exits the process
/// with the code the wire response implies. Never returns on success.
pub async fn run_client_command(socket: &Path, line: String) -> eyre::Result<()> {
    let response = client::send_request(socket, &line).await;
    let code = client::print_response(&response);
    std::process::exit(code);
}

/// Parses a `WxH` size argument into its width/height components.
pub fn parse_size(size: &str) -> eyre::Result<(usize, usize)> {
    let (width, height) = size
        .split_once('x')
        .ok_or_else(|| eyre!("--size must be in WxH form, got \"{size}\""))?;
    let width: usize = width
        .parse()
        .wrap_err_with(|| format!("invalid width in --size \"{size}\""))?;
    let height: usize = height
        .parse()
        .wrap_err_with(|| format!("invalid height in --size \"{size}\""))?;
    Ok((width, height))
}

/// Runs the daemon in the foreground: `EnsureReady`, bind the socket,
/// write the PID file, then serve until a shutdown source fires.
pub async fn run_daemon(args: StartArgs) -> eyre::Result<()> {
    let (width, height) = parse_size(&args.size)?;

    if !args.headless {
        return Err(LifecycleError::RendererUnavailable(
            "no windowed renderer is linked into this build; rerun with --headless true"
                .to_string(),
        )
        .into());
    }

    lifecycle::ensure_ready(
        &args.pid,
        &args.socket,
        lifecycle::process_alive,
        lifecycle::dial_socket,
    )
    .await
    .wrap_err("another daemon instance appears to be running")?;

    let canvas = Canvas::new(width, height).wrap_err("failed to create canvas")?;
    let history = Arc::new(Mutex::new(History::new(canvas)));

    let stop = Arc::new(Stopper::new());
    let handler_stop = stop.clone();
    let handler = Handler::new(history.clone(), move || handler_stop.stop());

    let server = Server::bind(&args.socket, handler).wrap_err("failed to bind socket")?;
    lifecycle::write_pid(&args.pid, std::process::id() as i32)
        .wrap_err("failed to write pid file")?;

    let render_sink: Box<dyn RenderSink> = Box::new(NullRenderSink);
    let render_history = history.clone();
    let render_stop = stop.clone();
    let render_task = tokio::spawn(async move {
        render_sink.run(render_history, render_stop).await;
    });

    let runtime = Runtime::new(args.pid.clone(), args.socket.clone(), stop);
    let result = runtime.run(server).await;
    render_task.abort();

    result.map_err(Into::into)
}

/// Spawns a detached daemon process and waits for its socket to become
/// connect-able before returning its PID.
pub async fn run_start(args: StartArgs) -> eyre::Result<u32> {
    let current_exe = std::env::current_exe().wrap_err("failed to resolve own executable path")?;

    let mut command = std::process::Command::new(current_exe);
    command
        .arg("daemon")
        .arg("--socket")
        .arg(&args.socket)
        .arg("--pid")
        .arg(&args.pid)
        .arg("--size")
        .arg(&args.size)
        .arg("--headless")
        .arg(args.headless.to_string());
    if let Some(scale) = args.scale {
        command.arg("--scale").arg(scale.to_string());
    }

    use std::os::unix::process::CommandExt;
    command.process_group(0);
    command.stdin(std::process::Stdio::null());

    let child = command.spawn().wrap_err("failed to spawn daemon process")?;
    let pid = child.id();

    wait_for_socket(&args.socket).await?;
    Ok(pid)
}

async fn wait_for_socket(socket_path: &Path) -> eyre::Result<()> {
    let deadline = tokio::time::Instant::now() + START_POLL_DEADLINE;
    loop {
        if lifecycle::dial_socket(socket_path).await.is_ok() {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(eyre!(
                "daemon did not become ready at {} within {:?}",
                socket_path.display(),
                START_POLL_DEADLINE
            ));
        }
        tokio::time::sleep(START_POLL_INTERVAL).await;
    }
}
