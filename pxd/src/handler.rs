//! Dispatches a parsed request to canvas/history operations and formats
//! the reply line. See `pxd_core::protocol` for line parsing/formatting.

use std::path::Path;
use std::sync::Arc;

use pxd_core::color;
use pxd_core::error::CoreError;
use pxd_core::history::History;
use pxd_core::protocol::{self, Request};
use tokio::sync::Mutex;

/// Handles one request line at a time against a shared history.
///
/// `on_stop` is invoked once the `stop` response has been formatted, not
/// before — a `stop` request always gets its `ok` reply built before any
/// shutdown side effect runs.
pub struct Handler {
    history: Arc<Mutex<History>>,
    on_stop: Arc<dyn Fn() + Send + Sync>,
}

impl Handler {
    pub fn new(history: Arc<Mutex<History>>, on_stop: impl Fn() + Send + Sync + 'static) -> Self {
        Handler {
            history,
            on_stop: Arc::new(on_stop),
        }
    }

    /// Parses and dispatches a single request line, returning the
    /// complete response line (no trailing newline).
    pub async fn handle(&self, line: &str) -> String {
        let request = match protocol::parse_line(line) {
            Ok(request) => request,
            Err(err) => return protocol::format_core_error(&err),
        };
        match self.dispatch(&request).await {
            Ok(payload) => protocol::format_ok(payload.as_deref()),
            Err(err) => protocol::format_core_error(&err),
        }
    }

    async fn dispatch(&self, request: &Request) -> Result<Option<String>, CoreError> {
        match request.command.as_str() {
            "set_pixel" => self.set_pixel(&request.args).await.map(|()| None),
            "get_pixel" => self.get_pixel(&request.args).await.map(Some),
            "fill_rect" => self.fill_rect(&request.args).await.map(|()| None),
            "line" => self.line(&request.args).await.map(|()| None),
            "clear" => self.clear(&request.args).await.map(|()| None),
            "export" => self.export(&request.args).await.map(|()| None),
            "undo" => self.undo(&request.args).await.map(|()| None),
            "redo" => self.redo(&request.args).await.map(|()| None),
            "stop" => self.stop(&request.args),
            other => Err(CoreError::InvalidCommand(format!(
                "unknown command \"{other}\""
            ))),
        }
    }

    async fn set_pixel(&self, args: &[String]) -> Result<(), CoreError> {
        check_arity(args, 3)?;
        let x = parse_int("x", &args[0])?;
        let y = parse_int("y", &args[1])?;
        let color = color::parse(&args[2])?;
        let mut history = self.history.lock().await;
        history.apply(|canvas| canvas.set_pixel(x, y, color))
    }

    async fn get_pixel(&self, args: &[String]) -> Result<String, CoreError> {
        check_arity(args, 2)?;
        let x = parse_int("x", &args[0])?;
        let y = parse_int("y", &args[1])?;
        let history = self.history.lock().await;
        let pixel = history.canvas().get_pixel(x, y)?;
        Ok(color::format(pixel))
    }

    async fn fill_rect(&self, args: &[String]) -> Result<(), CoreError> {
        check_arity(args, 5)?;
        let x = parse_int("x", &args[0])?;
        let y = parse_int("y", &args[1])?;
        let w = parse_int("w", &args[2])?;
        let h = parse_int("h", &args[3])?;
        let color = color::parse(&args[4])?;
        let mut history = self.history.lock().await;
        history.apply(|canvas| canvas.fill_rect(x, y, w, h, color))
    }

    async fn line(&self, args: &[String]) -> Result<(), CoreError> {
        check_arity(args, 5)?;
        let x1 = parse_int("x1", &args[0])?;
        let y1 = parse_int("y1", &args[1])?;
        let x2 = parse_int("x2", &args[2])?;
        let y2 = parse_int("y2", &args[3])?;
        let color = color::parse(&args[4])?;
        let mut history = self.history.lock().await;
        history.apply(|canvas| canvas.line(x1, y1, x2, y2, color))
    }

    async fn clear(&self, args: &[String]) -> Result<(), CoreError> {
        if args.len() > 1 {
            return Err(CoreError::InvalidArgs(format!(
                "expected 0 or 1 args, got {}",
                args.len()
            )));
        }
        let color = match args.first() {
            Some(token) => color::parse(token)?,
            None => color::Color::TRANSPARENT,
        };
        let mut history = self.history.lock().await;
        history.apply(|canvas| {
            canvas.clear(color);
            Ok(())
        })
    }

    async fn export(&self, args: &[String]) -> Result<(), CoreError> {
        check_arity(args, 1)?;
        let history = self.history.lock().await;
        history.canvas().export_png(Path::new(&args[0]))
    }

    async fn undo(&self, args: &[String]) -> Result<(), CoreError> {
        check_arity(args, 0)?;
        let mut history = self.history.lock().await;
        history.undo()
    }

    async fn redo(&self, args: &[String]) -> Result<(), CoreError> {
        check_arity(args, 0)?;
        let mut history = self.history.lock().await;
        history.redo()
    }

    fn stop(&self, args: &[String]) -> Result<Option<String>, CoreError> {
        check_arity(args, 0)?;
        (self.on_stop)();
        Ok(None)
    }
}

fn check_arity(args: &[String], expected: usize) -> Result<(), CoreError> {
    if args.len() != expected {
        return Err(CoreError::InvalidArgs(format!(
            "expected {expected} args, got {}",
            args.len()
        )));
    }
    Ok(())
}

fn parse_int(name: &str, token: &str) -> Result<i64, CoreError> {
    token
        .parse::<i64>()
        .map_err(|_| CoreError::InvalidArgs(format!("{name} must be an integer")))
}
