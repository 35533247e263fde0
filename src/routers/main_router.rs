use std::sync::Arc;

use axum::{Json, Router, middleware::from_fn_with_state, response::IntoResponse, routing::get};
use tonic::server::NamedService;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    docs::ApiDoc,
    handlers::{
        server::{fallback::fallback_handler, healthcheck::healthcheck, root::root_handler},
        voting::vote::VotingService,
    },
    init::state::ServerState,
    proto::{FILE_DESCRIPTOR_SET, voting::voting_server::VotingServer},
    routers::middleware::{
        catch_panic::{grpc_internal_on_panic, http_internal_on_panic},
        logging::log_middleware,
    },
};

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

fn grpc_path<S: NamedService>(_: &S) -> String {
    format!("/{}/{{*rpc}}", S::NAME)
}

/// One router for both surfaces: gRPC calls under `/voting.Voting/` and
/// `/grpc.reflection.v1.ServerReflection/`, and the JSON routes, told apart by path. Unclaimed
/// gRPC paths are answered by the fallback with `Unimplemented`.
pub fn build_router(state: Arc<ServerState>) -> anyhow::Result<Router> {
    let log_middleware = from_fn_with_state(state.clone(), log_middleware);

    let voting_server = VotingServer::new(VotingService::new(state.clone()));
    let reflection_server = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let grpc_router = Router::new()
        .route_service(&grpc_path(&voting_server), voting_server)
        .route_service(&grpc_path(&reflection_server), reflection_server)
        .layer(CatchPanicLayer::custom(grpc_internal_on_panic));

    let api_router = Router::new()
        .route("/", get(root_handler))
        .route("/api/healthcheck/server", get(healthcheck))
        .route("/api/openapi.json", get(openapi_json))
        .layer(CatchPanicLayer::custom(http_internal_on_panic))
        .with_state(state);

    Ok(Router::new()
        .merge(grpc_router)
        .merge(api_router)
        .fallback(fallback_handler)
        .layer(log_middleware)
        .layer(TraceLayer::new_for_http()))
}
