use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use serde_derive::Serialize;
use std::error::Error;
use std::fmt;
use tonic::Code;
use tonic::metadata::{Ascii, MetadataValue};
use tracing::Level;

pub struct CodeError {
    pub success: bool,
    pub error_code: u16,
    pub grpc_code: Code,
    pub http_status_code: StatusCode,
    pub message: &'static str,
    pub log_level: Level,
}

impl CodeError {
    pub const VOTE_URL_EMPTY: CodeError = CodeError {
        success: false,
        error_code: 1,
        grpc_code: Code::InvalidArgument,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Vote url must not be empty!",
        log_level: Level::INFO,
    };
    pub const VOTE_DIRECTION_INVALID: CodeError = CodeError {
        success: false,
        error_code: 2,
        grpc_code: Code::InvalidArgument,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Invalid vote provided!",
        log_level: Level::INFO,
    };
    pub const METHOD_NOT_BOUND: CodeError = CodeError {
        success: false,
        error_code: 3,
        grpc_code: Code::Unimplemented,
        http_status_code: StatusCode::NOT_IMPLEMENTED,
        message: "Method is not bound on this endpoint!",
        log_level: Level::WARN,
    };
    pub const INTERNAL_FAULT: CodeError = CodeError {
        success: false,
        error_code: 4,
        grpc_code: Code::Internal,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Internal fault while handling the call!",
        log_level: Level::ERROR,
    };
    pub const PATH_NOT_FOUND: CodeError = CodeError {
        success: false,
        error_code: 5,
        grpc_code: Code::NotFound,
        http_status_code: StatusCode::NOT_FOUND,
        message: "Invalid path! Probes, go away.",
        log_level: Level::DEBUG,
    };
}

pub fn code_err(cerr: CodeError, e: impl ToString) -> CodeErrorResp {
    CodeErrorResp {
        success: cerr.success,
        error_code: cerr.error_code,
        grpc_code: cerr.grpc_code,
        http_status_code: cerr.http_status_code,
        message: cerr.message.to_string(),
        error_message: e.to_string(),
        log_level: cerr.log_level,
    }
}

impl From<CodeError> for CodeErrorResp {
    fn from(cerr: CodeError) -> Self {
        code_err(cerr, "")
    }
}

#[derive(Serialize, Debug)]
pub struct CodeErrorResp {
    pub success: bool,
    pub error_code: u16,
    #[serde(serialize_with = "serialize_grpc_code")]
    pub grpc_code: Code,
    #[serde(serialize_with = "serialize_status_code")]
    pub http_status_code: StatusCode,
    pub message: String,
    pub error_message: String,
    #[serde(skip)]
    pub log_level: Level,
}

fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn serialize_grpc_code<S>(code: &Code, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i32(*code as i32)
}

impl CodeErrorResp {
    /// Message and detail joined the way callers see them in `grpc-message`.
    pub fn detail(&self) -> String {
        if self.error_message.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, self.error_message)
        }
    }

    /// The status gRPC callers receive, with the numeric error code in `x-error-code` metadata.
    pub fn to_status(&self) -> tonic::Status {
        let mut status = tonic::Status::new(self.grpc_code, self.detail());
        if let Ok(error_code) = self.error_code.to_string().parse::<MetadataValue<Ascii>>() {
            status.metadata_mut().insert("x-error-code", error_code);
        }
        status
    }

    /// Renders the error as a trailers-only gRPC reply: HTTP 200 with the status in the headers
    /// and an empty body.
    pub fn into_grpc_response(self) -> axum::response::Response {
        let mut response = self.to_status().into_http::<axum::body::Body>();
        insert_log_headers(response.headers_mut(), &self);
        response
    }
}

fn insert_log_headers(headers: &mut axum::http::HeaderMap, resp: &CodeErrorResp) {
    headers.insert(
        "x-error-log-level",
        HeaderValue::from_static(resp.log_level.as_str()),
    );
    headers.insert(
        "x-error-status-code",
        HeaderValue::from(resp.http_status_code.as_u16()),
    );
    headers.insert("x-error-code", HeaderValue::from(resp.error_code));
    if let Ok(message) = HeaderValue::from_str(&resp.message) {
        headers.insert("x-error-message", message);
    }
    if let Ok(detail) = HeaderValue::from_str(&resp.error_message) {
        headers.insert("x-error-detail", detail);
    }
}

impl fmt::Display for CodeErrorResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.error_message)
    }
}

impl Error for CodeErrorResp {}

impl From<CodeErrorResp> for tonic::Status {
    fn from(resp: CodeErrorResp) -> Self {
        resp.to_status()
    }
}

impl IntoResponse for CodeErrorResp {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string());
        let mut response = (
            self.http_status_code,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();
        insert_log_headers(response.headers_mut(), &self);
        response
    }
}
