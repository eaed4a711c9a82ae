use std::error::Error as StdError;

/// Why a run ended without a response. HTTP status codes never land here.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The body text of a POST/PUT/PATCH draft is not valid JSON.
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("a url is required")]
    MissingUrl,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The HTTP exchange could not be completed at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid header {0}")]
    InvalidHeader(String),

    /// DNS, connect, TLS, timeout and body read failures.
    #[error("{0}")]
    Request(String),
}

pub(crate) const GENERIC_REQUEST_ERROR: &str = "a request error occurred";

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(describe(&err))
    }
}

/// Join an error and its sources into one line, skipping repeats.
pub(crate) fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        let msg = e.to_string();
        if !msg.is_empty() && !parts.iter().any(|p| p.contains(&msg)) {
            parts.push(msg);
        }
        current = e.source();
    }

    if parts.is_empty() {
        GENERIC_REQUEST_ERROR.to_string()
    } else {
        parts.join(": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Silent;

    impl fmt::Display for Silent {
        fn fmt(&self, _f: &mut fmt::Formatter) -> fmt::Result {
            Ok(())
        }
    }

    impl StdError for Silent {}

    #[test]
    fn describe_should_fall_back_to_generic_message() {
        assert_eq!(describe(&Silent), GENERIC_REQUEST_ERROR);
    }

    #[test]
    fn describe_should_include_sources() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = TransportError::InvalidUrl {
            url: "not a url".into(),
            source,
        };
        let msg = describe(&err);
        assert!(msg.starts_with("invalid url not a url"));
        assert_eq!(msg.matches("relative URL without a base").count(), 1);
    }

    #[test]
    fn invalid_json_message_is_stable() {
        assert_eq!(RunError::InvalidJson.to_string(), "Invalid JSON");
    }
}
