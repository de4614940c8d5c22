//! Command-line surface: argument parsing only. Request-line formatting
//! and process orchestration live in `client`/`main`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use const_format::formatcp;

const DEFAULT_STATE_DIR: &str = "/tmp";
pub const DEFAULT_SOCKET_PATH: &str = formatcp!("{DEFAULT_STATE_DIR}/pxcli.sock");
pub const DEFAULT_PID_PATH: &str = formatcp!("{DEFAULT_STATE_DIR}/pxcli.pid");
pub const DEFAULT_SIZE: &str = "32x32";

#[derive(Debug, Parser)]
#[command(name = "pxd", about = "Pixel-editing daemon and command-line client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Spawn a detached daemon and wait for it to accept connections.
    Start(StartArgs),
    /// Ask a running daemon to shut down.
    Stop(SocketArgs),
    /// Run the daemon in the foreground. Spawned by `start`; not meant
    /// to be invoked directly.
    #[command(hide = true)]
    Daemon(StartArgs),
    #[command(name = "set-pixel")]
    SetPixel(SetPixelArgs),
    #[command(name = "get-pixel")]
    GetPixel(GetPixelArgs),
    #[command(name = "fill-rect")]
    FillRect(FillRectArgs),
    Line(LineArgs),
    Clear(ClearArgs),
    Export(ExportArgs),
    Undo(SocketArgs),
    Redo(SocketArgs),
}

#[derive(Debug, Args)]
pub struct SocketArgs {
    #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
    pub socket: PathBuf,
}

#[derive(Debug, Args)]
pub struct StartArgs {
    #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
    pub socket: PathBuf,

    #[arg(long, default_value = DEFAULT_PID_PATH)]
    pub pid: PathBuf,

    /// Canvas dimensions as `WxH`.
    #[arg(long, default_value = DEFAULT_SIZE)]
    pub size: String,

    /// Reserved for a windowed renderer; accepted but unused by this core.
    #[arg(long)]
    pub scale: Option<u32>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub headless: bool,
}

#[derive(Debug, Args)]
pub struct SetPixelArgs {
    #[command(flatten)]
    pub socket: SocketArgs,
    pub x: i64,
    pub y: i64,
    pub color: String,
}

#[derive(Debug, Args)]
pub struct GetPixelArgs {
    #[command(flatten)]
    pub socket: SocketArgs,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Args)]
pub struct FillRectArgs {
    #[command(flatten)]
    pub socket: SocketArgs,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
    pub color: String,
}

#[derive(Debug, Args)]
pub struct LineArgs {
    #[command(flatten)]
    pub socket: SocketArgs,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    pub color: String,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    #[command(flatten)]
    pub socket: SocketArgs,
    pub color: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub socket: SocketArgs,
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pixel_parses_positional_args() {
        let cli = Cli::parse_from(["pxd", "set-pixel", "1", "2", "red"]);
        match cli.command {
            Command::SetPixel(args) => {
                assert_eq!(args.x, 1);
                assert_eq!(args.y, 2);
                assert_eq!(args.color, "red");
                assert_eq!(args.socket.socket, PathBuf::from(DEFAULT_SOCKET_PATH));
            }
            other => panic!("expected SetPixel, got {other:?}"),
        }
    }

    #[test]
    fn daemon_subcommand_is_hidden_but_parseable() {
        let cli = Cli::parse_from(["pxd", "daemon", "--size", "8x8"]);
        match cli.command {
            Command::Daemon(args) => assert_eq!(args.size, "8x8"),
            other => panic!("expected Daemon, got {other:?}"),
        }
    }

    #[test]
    fn clear_accepts_optional_color() {
        let cli = Cli::parse_from(["pxd", "clear"]);
        match cli.command {
            Command::Clear(args) => assert_eq!(args.color, None),
            other => panic!("expected Clear, got {other:?}"),
        }
    }
}
