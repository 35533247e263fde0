use axum::{
    extract::Request,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::errors::code_error::{CodeError, code_err};

/// Anything no route claimed. gRPC callers get `Unimplemented` in gRPC framing, everyone else a
/// JSON 404.
pub async fn fallback_handler(request: Request) -> Response {
    let path = request.uri().path().to_owned();

    if is_grpc_request(&request) {
        return code_err(CodeError::METHOD_NOT_BOUND, path).into_grpc_response();
    }

    code_err(CodeError::PATH_NOT_FOUND, path).into_response()
}

pub fn is_grpc_request<B>(request: &axum::http::Request<B>) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .map(|content_type| content_type.as_bytes())
        .is_some_and(|content_type| content_type.starts_with(b"application/grpc"))
}
