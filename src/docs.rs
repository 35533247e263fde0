//! OpenAPI document for the HTTP side of the endpoint.
//!
//! The gRPC service is described by `proto/voting.proto`, not here. Utoipa only exposes
//! operations listed in `#[openapi(paths(...))]`; handlers still need `#[utoipa::path(...)]`.

use utoipa::OpenApi;

use crate::handlers::server::{healthcheck, root};

#[derive(OpenApi)]
#[openapi(
    info(title = "voting-endpoint", description = "HTTP routes served next to voting.Voting"),
    paths(root::root_handler, healthcheck::healthcheck),
    components(schemas(root::RootHandlerResponse, healthcheck::ServerHealthcheckResponse)),
    tags((name = "server", description = "Liveness and build information"))
)]
pub struct ApiDoc;
