use std::any::Any;

use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::errors::code_error::{CodeError, code_err};

fn panic_detail(err: &(dyn Any + Send + 'static)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Turns a panic inside a gRPC call into a trailers-only `Internal` status.
pub fn grpc_internal_on_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_detail(err.as_ref());
    error!(kind = "panic", surface = "grpc", detail = %detail, "Call panicked");
    code_err(CodeError::INTERNAL_FAULT, detail).into_grpc_response()
}

pub fn http_internal_on_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_detail(err.as_ref());
    error!(kind = "panic", surface = "http", detail = %detail, "Handler panicked");
    code_err(CodeError::INTERNAL_FAULT, detail).into_response()
}
