use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::RunError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    /// POST, PUT and PATCH carry a JSON body; GET and DELETE never do.
    pub fn has_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unsupported method: {}", s))
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Patch => http::Method::PATCH,
            Method::Delete => http::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.key.trim().is_empty() || self.value.trim().is_empty()
    }
}

/// The request as composed in the form, before anything is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub url: String,
    pub method: Method,
    pub headers: Vec<HeaderEntry>,
    pub body_text: String,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDraft {
    /// An empty GET draft with a single blank header row.
    pub fn new() -> Self {
        Self {
            url: String::new(),
            method: Method::Get,
            headers: vec![HeaderEntry::default()],
            body_text: String::new(),
        }
    }

    pub fn with_url(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            body_text: String::new(),
        }
    }

    /// A blank url is never sent.
    pub fn check_url(url: &str) -> Result<(), RunError> {
        match url.trim().is_empty() {
            true => Err(RunError::MissingUrl),
            false => Ok(()),
        }
    }

    pub fn is_sendable(&self) -> bool {
        Self::check_url(&self.url).is_ok()
    }

    pub fn add_header(&mut self) {
        self.headers.push(HeaderEntry::default());
    }

    pub fn remove_header(&mut self, index: usize) {
        if index < self.headers.len() {
            self.headers.remove(index);
        }
    }

    pub fn set_header_key(&mut self, index: usize, key: impl Into<String>) {
        if let Some(entry) = self.headers.get_mut(index) {
            entry.key = key.into();
        }
    }

    pub fn set_header_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(entry) = self.headers.get_mut(index) {
            entry.value = value.into();
        }
    }
}

/// Flatten header rows into key-unique pairs.
/// - rows with a blank key or value are skipped
/// - a repeated key keeps its first position but takes the last value
pub fn flatten_headers(entries: &[HeaderEntry]) -> Vec<(String, String)> {
    let mut flat: Vec<(String, String)> = Vec::with_capacity(entries.len());
    for entry in entries.iter().filter(|e| !e.is_blank()) {
        match flat.iter_mut().find(|(k, _)| *k == entry.key) {
            Some((_, v)) => *v = entry.value.clone(),
            None => flat.push((entry.key.clone(), entry.value.clone())),
        }
    }
    flat
}

/// Parse the outgoing JSON body. GET and DELETE bodies are ignored without
/// being looked at.
pub fn parse_body(method: Method, body_text: &str) -> Result<Option<Value>, RunError> {
    if !method.has_body() || body_text.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(body_text)
        .map(Some)
        .map_err(|_| RunError::InvalidJson)
}
