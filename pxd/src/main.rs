use clap::Parser;
use color_eyre::eyre;
use color_eyre::eyre::WrapErr;
use tracing_subscriber::EnvFilter;

use pxd::cli::{Cli, Command, ExportArgs, FillRectArgs, GetPixelArgs, LineArgs, SetPixelArgs};
use pxd::{run_client_command, run_daemon, run_start};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Start(args) => {
            let pid = run_start(args).await?;
            println!("{pid}");
            Ok(())
        }
        Command::Stop(args) => run_client_command(&args.socket, "stop".to_string()).await,
        Command::Daemon(args) => run_daemon(args).await,
        Command::SetPixel(SetPixelArgs { socket, x, y, color }) => {
            run_client_command(&socket.socket, format!("set_pixel {x} {y} {color}")).await
        }
        Command::GetPixel(GetPixelArgs { socket, x, y }) => {
            run_client_command(&socket.socket, format!("get_pixel {x} {y}")).await
        }
        Command::FillRect(FillRectArgs { socket, x, y, w, h, color }) => {
            run_client_command(&socket.socket, format!("fill_rect {x} {y} {w} {h} {color}")).await
        }
        Command::Line(LineArgs { socket, x1, y1, x2, y2, color }) => {
            run_client_command(&socket.socket, format!("line {x1} {y1} {x2} {y2} {color}")).await
        }
        Command::Clear(args) => {
            let line = match args.color {
                Some(color) => format!("clear {color}"),
                None => "clear".to_string(),
            };
            run_client_command(&args.socket.socket, line).await
        }
        Command::Export(ExportArgs { socket, path }) => {
            let absolute = std::path::absolute(&path)
                .wrap_err_with(|| format!("failed to resolve export path {}", path.display()))?;
            run_client_command(&socket.socket, format!("export {}", absolute.display())).await
        }
        Command::Undo(args) => run_client_command(&args.socket, "undo".to_string()).await,
        Command::Redo(args) => run_client_command(&args.socket, "redo".to_string()).await,
    }
}
