//! HTTP request description and API error types used by the network client

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// HTTP verbs supported by [`ApiRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to be executed by the network client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// A bodiless GET request
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Parse `url` and build a GET request, failing with [`ApiError::InvalidUrl`]
    pub fn parse(url: &str) -> Result<Self, ApiError> {
        Url::parse(url)
            .map(Self::get)
            .map_err(|_| ApiError::InvalidUrl)
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `value` as the JSON body and set the content type
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, ApiError> {
        let body =
            serde_json::to_vec(value).map_err(|e| ApiError::DecodingError(e.to_string()))?;
        Ok(self
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }
}

/// Envelope returned by the backend API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload of a successful response
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::ServerError(
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        self.data.ok_or(ApiError::NoData)
    }
}

/// Decode a JSON [`ApiResponse`] envelope from raw bytes
pub fn decode_response<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let response: ApiResponse<T> =
        serde_json::from_slice(bytes).map_err(|e| ApiError::DecodingError(e.to_string()))?;
    response.into_result()
}

/// Failures surfaced by the network client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("No data received")]
    NoData,

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Network error: {0}")]
    NetworkError(u16),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::parse("https://api.example.com/workouts")
            .unwrap()
            .with_method(HttpMethod::Post)
            .with_header("Authorization", "Bearer abc");

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers.get("Authorization").unwrap(), "Bearer abc");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(ApiRequest::parse("not a url"), Err(ApiError::InvalidUrl));
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let request = ApiRequest::parse("https://api.example.com")
            .unwrap()
            .with_json(&serde_json::json!({"name": "Test"}))
            .unwrap();
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.body.as_deref(), Some(br#"{"name":"Test"}"#.as_slice()));
    }

    #[test]
    fn test_decode_response_success() {
        let body = br#"{"data": {"id": 1}, "message": null, "success": true}"#;
        let value: serde_json::Value = decode_response(body).unwrap();
        assert_eq!(value["id"], 1);
    }

    #[test]
    fn test_decode_response_failure_envelope() {
        let body = br#"{"data": null, "message": "maintenance", "success": false}"#;
        let err = decode_response::<serde_json::Value>(body).unwrap_err();
        assert_eq!(err, ApiError::ServerError("maintenance".into()));
    }

    #[test]
    fn test_decode_response_missing_data() {
        let body = br#"{"data": null, "success": true}"#;
        let err = decode_response::<serde_json::Value>(body).unwrap_err();
        assert_eq!(err, ApiError::NoData);
    }

    #[test]
    fn test_error_descriptions() {
        assert_eq!(ApiError::InvalidUrl.to_string(), "Invalid URL");
        assert_eq!(ApiError::NoData.to_string(), "No data received");
        assert_eq!(ApiError::NetworkError(404).to_string(), "Network error: 404");
        assert_eq!(
            ApiError::ServerError("boom".into()).to_string(),
            "Server error: boom"
        );
    }
}
