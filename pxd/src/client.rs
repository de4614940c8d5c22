//! The client side of the wire protocol: connect, send one line, read
//! one line back. Formatting request lines from parsed CLI arguments and
//! deciding the process exit code also live here since neither needs
//! more than a few lines.

use std::io;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use pxd_core::protocol::format_error;

/// Sends `line` (without a trailing newline) to the daemon listening at
/// `socket_path` and returns its one-line response, also without a
/// trailing newline. Always returns a wire-shaped line: a failure to
/// reach the daemon at all is reported as `err daemon_not_running
/// <message>` or `err io <message>`, the same as a failure the daemon
/// itself would have written.
pub async fn send_request(socket_path: &Path, line: &str) -> String {
    let stream = match UnixStream::connect(socket_path).await {
        Ok(stream) => stream,
        Err(err) => return format_error(classify_dial_error(&err), &err.to_string()),
    };

    match exchange(stream, line).await {
        Ok(response) => response,
        Err(err) => format_error("io", &err.to_string()),
    }
}

async fn exchange(mut stream: UnixStream, line: &str) -> io::Result<String> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await?;

    let mut reader = BufReader::new(stream);
    let mut response = String::new();
    reader.read_line(&mut response).await?;
    Ok(response.trim_end_matches(['\n', '\r']).to_string())
}

/// Distinguishes "nothing is listening here" from other connect failures,
/// mirroring `classifyDialError`: a missing socket path or a refused
/// connection both mean no daemon is running, everything else is a plain
/// I/O failure.
fn classify_dial_error(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => "daemon_not_running",
        _ => "io",
    }
}

/// Prints `response` to stdout on `ok`, to stderr on `err`, and returns
/// the process exit code that should follow.
pub fn print_response(response: &str) -> i32 {
    if response.starts_with("err") {
        eprintln!("{response}");
        1
    } else {
        println!("{response}");
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_exits_zero() {
        assert_eq!(print_response("ok #ff0000ff"), 0);
    }

    #[test]
    fn err_response_exits_nonzero() {
        assert_eq!(print_response("err out_of_bounds pixel (-1,0) outside canvas"), 1);
    }

    #[tokio::test]
    async fn send_request_reports_daemon_not_running_for_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("no-such-daemon.sock");
        let response = send_request(&socket_path, "ping").await;
        assert!(
            response.starts_with("err daemon_not_running"),
            "got {response:?}"
        );
    }
}
