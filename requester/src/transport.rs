use std::{future::Future, str::FromStr};

use http::{
    header::{HeaderName, CONTENT_TYPE},
    HeaderMap, HeaderValue,
};
use reqwest::{redirect::Policy, Client};
use serde_json::Value;
use url::Url;

use crate::{Method, RunnerConfig, TransportError};

/// A request that passed local validation and is ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Performs one HTTP exchange. Any received status code is a successful
/// exchange; only failing to complete it is an error.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        req: OutgoingRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &RunnerConfig) -> Result<Self, TransportError> {
        let policy = match config.max_redirects {
            0 => Policy::none(),
            n => Policy::limited(n),
        };
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .redirect(policy)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, req: OutgoingRequest) -> Result<TransportResponse, TransportError> {
        let url = Url::parse(req.url.trim()).map_err(|source| TransportError::InvalidUrl {
            url: req.url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(TransportError::UnsupportedScheme(scheme.to_string())),
        }

        let headers = to_header_map(&req.headers)?;
        let has_content_type = headers.contains_key(CONTENT_TYPE);
        let mut builder = self
            .client
            .request(req.method.into(), url)
            .headers(headers);

        if let Some(body) = &req.body {
            builder = match has_content_type {
                // keep the user's content-type, the body is still JSON text
                true => builder.body(body.to_string()),
                false => builder.json(body),
            };
        }

        let res = builder.send().await?;
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_header_map(pairs: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (k, v) in pairs {
        let name = HeaderName::from_str(k.trim())
            .map_err(|_| TransportError::InvalidHeader(format!("name: {:?}", k)))?;
        let value = HeaderValue::from_str(v.trim())
            .map_err(|_| TransportError::InvalidHeader(format!("value for {}: {:?}", k, v)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> OutgoingRequest {
        OutgoingRequest {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn header_map_should_reject_illegal_names() {
        let err = to_header_map(&[("bad header".into(), "v".into())]).unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader(_)));
    }

    #[test]
    fn header_map_should_keep_valid_pairs() {
        let map = to_header_map(&[
            ("Accept".into(), "application/json".into()),
            ("x-token".into(), " abc ".into()),
        ])
        .unwrap();
        assert_eq!(map["accept"], "application/json");
        assert_eq!(map["x-token"], "abc");
    }

    #[tokio::test]
    async fn malformed_url_should_fail_before_sending() {
        let transport = HttpTransport::new(&RunnerConfig::default()).unwrap();
        let err = transport.send(request("not a url")).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));

        let err = transport.send(request("ftp://example.com")).await.unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedScheme(s) if s == "ftp"));
    }
}
