//! HTTP fetch capability.
//!
//! The envelope core never talks to the network. Calling code supplies a
//! [`Fetch`] implementation; its only contract with the core is to deliver
//! complete response bytes which are then sealed into an envelope.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// HTTP method of a [`FetchRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request handed to the fetch capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response metadata passed through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub received_at: DateTime<Utc>,
}

/// Failure reported by the fetch capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be built or sent.
    Request(String),
    /// The response body could not be read completely.
    Body(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(reason) => write!(f, "request failed: {}", reason),
            Self::Body(reason) => write!(f, "reading response body failed: {}", reason),
        }
    }
}

impl std::error::Error for TransportError {}

/// Result of one fetch: any combination of body, metadata and error, as an
/// HTTP stack may report a response together with a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub body: Option<Vec<u8>>,
    pub metadata: Option<ResponseMeta>,
    pub error: Option<TransportError>,
}

impl FetchOutcome {
    pub fn success(body: Vec<u8>, metadata: ResponseMeta) -> Self {
        Self {
            body: Some(body),
            metadata: Some(metadata),
            error: None,
        }
    }

    pub fn failure(error: TransportError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// The HTTP client capability.
///
/// Implementations return only once the body is fully available; the core
/// never sees partial data.
pub trait Fetch {
    fn fetch(&self, request: &FetchRequest) -> FetchOutcome;
}

impl<T> Fetch for &T
where
    T: Fetch + ?Sized,
{
    fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        (**self).fetch(request)
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::{Fetch, FetchOutcome, FetchRequest, Method, ResponseMeta, TransportError};

    /// Blocking `reqwest` implementation of [`Fetch`].
    #[derive(Debug, Clone, Default)]
    pub struct HttpFetcher {
        client: reqwest::blocking::Client,
    }

    impl HttpFetcher {
        pub fn new(client: reqwest::blocking::Client) -> Self {
            Self { client }
        }
    }

    impl Fetch for HttpFetcher {
        fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = match builder.send() {
                Ok(response) => response,
                Err(err) => return FetchOutcome::failure(TransportError::Request(err.to_string())),
            };

            let metadata = ResponseMeta {
                url: response.url().to_string(),
                status: response.status().as_u16(),
                headers: response
                    .headers()
                    .iter()
                    .filter_map(|(name, value)| {
                        value
                            .to_str()
                            .ok()
                            .map(|v| (name.as_str().to_string(), v.to_string()))
                    })
                    .collect::<BTreeMap<_, _>>(),
                received_at: Utc::now(),
            };

            match response.bytes() {
                Ok(bytes) => FetchOutcome::success(bytes.to_vec(), metadata),
                Err(err) => FetchOutcome {
                    body: None,
                    metadata: Some(metadata),
                    error: Some(TransportError::Body(err.to_string())),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = FetchRequest::get("https://example.test/a").header("Accept", "application/json");
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.headers, vec![("Accept".to_string(), "application/json".to_string())]);
        assert!(request.body.is_none());

        let request = FetchRequest::post("https://example.test/b", b"{}".to_vec());
        assert_eq!(request.method.to_string(), "POST");
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_metadata_serialises_with_timestamp() {
        let meta = ResponseMeta {
            url: "https://example.test".into(),
            status: 200,
            headers: BTreeMap::from([("content-type".to_string(), "text/plain".to_string())]),
            received_at: Utc::now(),
        };
        let json = serde_json::to_string(&meta).unwrap();
        let back: ResponseMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
