//! Request/response line framing.
//!
//! A request is one command token followed by zero or more
//! whitespace-separated argument tokens. A response is always exactly one
//! line: `ok`, `ok <payload>`, or `err <code> <message>`.

use crate::error::CoreError;

/// Whitespace bytes recognized when splitting a request line into tokens.
const ASCII_WHITESPACE: [u8; 6] = [b' ', b'\t', b'\n', b'\r', 0x0b, 0x0c];

fn is_ascii_whitespace(byte: u8) -> bool {
    ASCII_WHITESPACE.contains(&byte)
}

/// A parsed request: a command identifier and its ordered argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: String,
    pub args: Vec<String>,
}

/// Splits a request line into whitespace-separated ASCII tokens.
fn fields_ascii(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && is_ascii_whitespace(bytes[i]) {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && !is_ascii_whitespace(bytes[i]) {
            i += 1;
        }
        if start < i {
            fields.push(&line[start..i]);
        }
    }
    fields
}

/// Parses a single request line (already stripped of its trailing LF/CR).
///
/// An empty or whitespace-only line fails `invalid_command`.
pub fn parse_line(line: &str) -> Result<Request, CoreError> {
    let fields = fields_ascii(line);
    let Some((command, args)) = fields.split_first() else {
        return Err(CoreError::InvalidCommand("command is required".to_string()));
    };
    Ok(Request {
        command: command.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
    })
}

/// Formats a success response, with an optional single payload token.
pub fn format_ok(payload: Option<&str>) -> String {
    match payload.map(str::trim).filter(|s| !s.is_empty()) {
        Some(payload) => format!("ok {payload}"),
        None => "ok".to_string(),
    }
}

/// Formats a failure response. An empty code defaults to `error`; an empty
/// message defaults to `unknown error`.
pub fn format_error(code: &str, message: &str) -> String {
    let code = if code.trim().is_empty() { "error" } else { code.trim() };
    let message = if message.trim().is_empty() {
        "unknown error"
    } else {
        message.trim()
    };
    format!("err {code} {message}")
}

/// Formats a [`CoreError`] as a response line.
pub fn format_core_error(err: &CoreError) -> String {
    format_error(err.code(), err.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("set_pixel 1 2 red", "set_pixel", vec!["1", "2", "red"])]
    #[case("undo", "undo", vec![])]
    #[case("  set_pixel   1\t2  red  ", "set_pixel", vec!["1", "2", "red"])]
    fn parses_requests(#[case] line: &str, #[case] command: &str, #[case] args: Vec<&str>) {
        let request = parse_line(line).unwrap();
        assert_eq!(request.command, command);
        assert_eq!(request.args, args);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\r")]
    fn rejects_empty_lines(#[case] line: &str) {
        let err = parse_line(line).unwrap_err();
        assert_eq!(err.code(), "invalid_command");
    }

    #[test]
    fn formats_ok_without_payload() {
        assert_eq!(format_ok(None), "ok");
    }

    #[test]
    fn formats_ok_with_payload() {
        assert_eq!(format_ok(Some("#ff0000ff")), "ok #ff0000ff");
    }

    #[test]
    fn formats_error_with_defaults() {
        assert_eq!(format_error("", ""), "err error unknown error");
    }

    #[test]
    fn formats_error() {
        assert_eq!(
            format_error("out_of_bounds", "pixel (-1,0) outside canvas"),
            "err out_of_bounds pixel (-1,0) outside canvas"
        );
    }
}
