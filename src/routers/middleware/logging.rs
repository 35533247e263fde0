use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, Response},
    middleware::Next,
};
use tokio::time::Instant;
use tracing::{Level, error};
use uuid::Uuid;

use crate::{
    build_info::{BUILD_TIME, RUST_VERSION},
    handlers::server::fallback::is_grpc_request,
    init::state::ServerState,
};

// one arm per level; tracing macros need the level at compile time
macro_rules! log_codeerror {
    ($level:expr_2021, $kind:expr_2021, response.request_id = $request_id:expr_2021, response.method = $method:expr_2021, response.path = $path:expr_2021, response.client_ip = $client_ip:expr_2021, response.status_code = $status_code:expr_2021, response.grpc_status = $grpc_status:expr_2021, response.duration = $duration:expr_2021, response.error_code = $error_code:expr_2021, response.message = $message:expr_2021, response.detail = $detail:expr_2021) => {
        match $level {
            Level::ERROR => tracing::error!(kind = %$kind, request_id = %$request_id, method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, grpc_status = %$grpc_status, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::WARN => tracing::warn!(kind = %$kind, request_id = %$request_id, method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, grpc_status = %$grpc_status, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::INFO => tracing::info!(kind = %$kind, request_id = %$request_id, method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, grpc_status = %$grpc_status, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::DEBUG => tracing::debug!(kind = %$kind, request_id = %$request_id, method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, grpc_status = %$grpc_status, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::TRACE => tracing::trace!(kind = %$kind, request_id = %$request_id, method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, grpc_status = %$grpc_status, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
        }
    };
}

const ERROR_HEADERS: [&str; 5] = [
    "x-error-log-level",
    "x-error-status-code",
    "x-error-code",
    "x-error-message",
    "x-error-detail",
];

pub async fn log_middleware(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    state.add_responses_handled();

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let grpc = is_grpc_request(&request);

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let client_ip: Option<IpAddr> = match request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        Some(val) => match val.split(',').next().unwrap_or("").trim().parse() {
            Ok(ip) => Some(ip),
            Err(e) => {
                error!(error = ?e, client_ip = val, "Could not parse IP address into IpAddr");
                peer
            }
        },
        None => peer,
    };

    tracing::info!(kind = %"RECV", request_id = %request_id, method = %method, path = %path, client_ip = ?client_ip, grpc = grpc);

    let mut response = next.run(request).await;
    let duration = start.elapsed();
    let headers = response.headers_mut();

    let grpc_status = header_value_to_str(headers.get("grpc-status"))
        .unwrap_or("")
        .to_owned();

    if headers.contains_key("x-error-log-level") {
        let log_level = header_value_to_str(headers.get("x-error-log-level")).unwrap_or("INFO");
        let status_code = header_value_to_str(headers.get("x-error-status-code")).unwrap_or("");
        let error_code = header_value_to_str(headers.get("x-error-code")).unwrap_or("");
        let message = header_value_to_str(headers.get("x-error-message")).unwrap_or("");
        let detail = header_value_to_str(headers.get("x-error-detail")).unwrap_or("");

        log_codeerror!(
            log_level.parse::<Level>().unwrap_or(Level::ERROR),
            "ERSP",
            response.request_id = request_id,
            response.method = method,
            response.path = path,
            response.client_ip = client_ip,
            response.status_code = status_code,
            response.grpc_status = grpc_status,
            response.duration = format!("{:?}", duration),
            response.error_code = error_code,
            response.message = message,
            response.detail = detail
        );

        for name in ERROR_HEADERS {
            headers.remove(name);
        }
    } else if let Some(status) =
        tonic::Status::from_header_map(headers).filter(|status| status.code() != tonic::Code::Ok)
    {
        // status raised inside the service, delivered trailers-only
        tracing::info!(kind = %"ERSP", request_id = %request_id, method = %method, path = %path, client_ip = ?client_ip, grpc_status = %grpc_status, message = %status.message(), duration = ?duration);
    } else {
        tracing::info!(kind = %"RESP", request_id = %request_id, method = %method, path = %path, client_ip = ?client_ip, duration = ?duration);
    }

    headers.insert("x-server-built-time", HeaderValue::from_static(BUILD_TIME));
    if let Ok(name) = HeaderValue::from_str(&state.get_app_name_version()) {
        headers.insert("x-server-name", name);
    }
    headers.insert(
        "x-server-rust-version",
        HeaderValue::from_static(RUST_VERSION),
    );
    if let Ok(id) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert("x-request-id", id);
    }

    response
}

fn header_value_to_str(value: Option<&HeaderValue>) -> Option<&str> {
    value.and_then(|v| v.to_str().ok())
}
