use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use http::{HeaderMap, StatusCode};
use mime::Mime;
use postwoman_lib::{classify, ExecutionResult, HeaderEntry, Payload, StatusClass};
use serde::Serialize;
use syntect::{
    easy::HighlightLines,
    highlighting::{Style, ThemeSet},
    parsing::SyntaxSet,
    util::{as_24_bit_terminal_escaped, LinesWithEndings},
};

/// Parse a `key: value` header argument. Key and value are trimmed.
pub fn parse_header(s: &str) -> Result<HeaderEntry> {
    let (key, val) = s
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("invalid header {:?}, expected key: value", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow::anyhow!("missing header name in {:?}", s));
    }
    Ok(HeaderEntry::new(key, val.trim()))
}

pub fn get_config_file(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(anyhow::anyhow!("config file not found"))
    }
}

/// First existing default config location, if any.
pub fn get_default_config(name: &str) -> Option<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Ok(home) = std::env::var("HOME") {
        paths.push(format!("{}/.config/{}", home, name));
    }
    paths.push(format!("./{}", name));
    paths.push(format!("/etc/{}", name));

    paths
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Highlight `s` with the syntax registered for `ext`. Unknown syntaxes and
/// highlighting failures return the text unchanged.
pub fn highlight(s: &str, ext: &str) -> String {
    // Load these once at the start of your program
    let ps = SyntaxSet::load_defaults_newlines();
    let ts = ThemeSet::load_defaults();
    let Some(syntax) = ps.find_syntax_by_extension(ext) else {
        return s.to_string();
    };
    let mut h = HighlightLines::new(syntax, &ts.themes["base16-ocean.dark"]);
    let mut out = String::with_capacity(s.len() * 2);
    for line in LinesWithEndings::from(s) {
        let ranges: Vec<(Style, &str)> = match h.highlight_line(line, &ps) {
            Ok(ranges) => ranges,
            Err(_) => return s.to_string(),
        };
        out.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
    }
    out.push_str("\x1b[0m");
    out
}

pub fn print_syntect(output: &mut Vec<String>, s: String, ext: &str) {
    if atty::isnt(atty::Stream::Stdout) {
        output.push(s);
        return;
    }
    output.push(highlight(&s, ext));
}

/// Everything received, serialized as-is for the raw view.
#[derive(Serialize)]
struct Envelope<'a> {
    status: Option<u16>,
    status_text: Option<&'static str>,
    #[serde(with = "http_serde::header_map")]
    headers: HeaderMap,
    body: Option<&'a Payload>,
    elapsed_ms: Option<u64>,
}

pub fn raw_view(result: &ExecutionResult) -> String {
    let envelope = Envelope {
        status: result.status,
        status_text: result
            .status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .and_then(|code| code.canonical_reason()),
        headers: result.headers.clone(),
        body: result.payload.as_ref(),
        elapsed_ms: result.elapsed_ms,
    };
    serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| format!("{:?}", result))
}

/// Pretty-printed payload, or the raw view when it cannot be pretty-printed.
pub fn json_view(result: &ExecutionResult) -> String {
    match &result.payload {
        Some(payload) => {
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| raw_view(result))
        }
        None => raw_view(result),
    }
}

pub fn status_badge(status: Option<u16>) -> String {
    let text = match status {
        Some(code) => format!(" {} ", code),
        None => " - ".to_string(),
    };
    match classify(status) {
        StatusClass::None => text.dimmed().to_string(),
        StatusClass::Success => text.black().on_green().to_string(),
        StatusClass::Redirect => text.white().on_blue().to_string(),
        StatusClass::ClientError => text.black().on_yellow().to_string(),
        StatusClass::ServerError => text.white().on_red().to_string(),
    }
}

pub fn elapsed_badge(ms: u64) -> String {
    format!("{}ms", ms).bold().to_string()
}

fn content_type(headers: &HeaderMap) -> Option<Mime> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Render a completed run: badges, then the chosen view, or the failure
/// message in place of the response.
pub fn print_result(output: &mut Vec<String>, result: &ExecutionResult, raw: bool) {
    if let Some(err) = &result.error {
        output.push(format!("{} {}\n", "Request failed:".red().bold(), err));
        return;
    }

    let mut badges = status_badge(result.status);
    if let Some(ms) = result.elapsed_ms {
        badges = format!("{} {}", badges, elapsed_badge(ms));
    }
    output.push(format!("{}\n\n", badges));

    if raw {
        print_syntect(output, raw_view(result), "json");
    } else {
        match (&result.payload, content_type(&result.headers)) {
            (Some(Payload::Text(text)), Some(m)) if m.subtype() == mime::HTML => {
                print_syntect(output, text.clone(), "html")
            }
            _ => print_syntect(output, json_view(result), "json"),
        }
    }
    output.push("\n".into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::{json, Value};

    fn completed(status: u16, payload: Payload) -> ExecutionResult {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        ExecutionResult {
            status: Some(status),
            elapsed_ms: Some(12),
            headers,
            payload: Some(payload),
            error: None,
        }
    }

    #[test]
    fn parse_header_should_work() {
        assert_eq!(
            parse_header("Accept: application/json").unwrap(),
            HeaderEntry::new("Accept", "application/json")
        );
        assert_eq!(
            parse_header("x-url:http://a.b/c").unwrap(),
            HeaderEntry::new("x-url", "http://a.b/c")
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(" : value").is_err());
    }

    #[test]
    fn raw_view_should_contain_envelope() {
        let result = completed(404, Payload::Json(json!({"error": "not found"})));
        let raw: Value = serde_json::from_str(&raw_view(&result)).unwrap();
        assert_eq!(raw["status"], 404);
        assert_eq!(raw["status_text"], "Not Found");
        assert_eq!(raw["headers"]["content-type"], "application/json");
        assert_eq!(raw["body"]["error"], "not found");
        assert_eq!(raw["elapsed_ms"], 12);
    }

    #[test]
    fn raw_view_should_leave_unknown_reason_empty() {
        let result = completed(599, Payload::Text(String::new()));
        let raw: Value = serde_json::from_str(&raw_view(&result)).unwrap();
        assert_eq!(raw["status"], 599);
        assert!(raw["status_text"].is_null());
    }

    #[test]
    fn json_view_should_pretty_print_payload() {
        let result = completed(200, Payload::Json(json!({"a": [1]})));
        assert_eq!(json_view(&result), "{\n  \"a\": [\n    1\n  ]\n}");

        let result = completed(200, Payload::Text("plain".into()));
        assert_eq!(json_view(&result), "\"plain\"");
    }

    #[test]
    fn highlight_should_fall_back_for_unknown_syntax() {
        assert_eq!(highlight("{\"a\": 1}", "no-such-syntax"), "{\"a\": 1}");
        let colored = highlight("{\"a\": 1}\n", "json");
        assert!(colored.contains("\x1b["));
    }

    #[test]
    fn failed_run_should_print_message_only() {
        colored::control::set_override(false);
        let result = ExecutionResult {
            error: Some("Invalid JSON".into()),
            ..Default::default()
        };
        let mut output = Vec::new();
        print_result(&mut output, &result, false);
        assert_eq!(output, vec!["Request failed: Invalid JSON\n".to_string()]);
    }

    #[test]
    fn badges_should_show_status_and_time() {
        colored::control::set_override(false);
        let result = completed(201, Payload::Json(json!(null)));
        let mut output = Vec::new();
        print_result(&mut output, &result, false);
        assert_eq!(output[0], " 201  12ms\n\n");
        assert_eq!(status_badge(None), " - ");
    }
}
