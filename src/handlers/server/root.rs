use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use serde_derive::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::responses::response_data::http_resp,
    init::state::ServerState,
    util::time::{duration_formatter::format_duration, now::tokio_now},
};

#[derive(Serialize, ToSchema)]
pub struct RootHandlerResponse {
    app_name_version: String,
    server_uptime: String,
    responses_handled: u64,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "server",
    responses(
        (status = 200, description = "Server uptime and traffic", body = RootHandlerResponse)
    )
)]
pub async fn root_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let start = tokio_now();

    http_resp::<RootHandlerResponse, ()>(
        RootHandlerResponse {
            app_name_version: state.get_app_name_version(),
            server_uptime: format_duration(state.get_uptime()),
            responses_handled: state.get_responses_handled(),
        },
        (),
        start,
    )
}
