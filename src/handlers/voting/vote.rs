use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

use crate::{
    domain::vote::Ballot,
    init::state::ServerState,
    proto::voting::{VotingRequest, VotingResponse, voting_server::Voting},
    util::time::now::tokio_now,
};

/// The `voting.Voting` implementation. Stateless per call; `state` is only read for logging.
pub struct VotingService {
    state: Arc<ServerState>,
}

impl VotingService {
    pub fn new(state: Arc<ServerState>) -> Self {
        VotingService { state }
    }
}

impl Voting for VotingService {
    async fn vote(
        &self,
        request: Request<VotingRequest>,
    ) -> Result<Response<VotingResponse>, Status> {
        let start = tokio_now();
        let remote_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);

        let ballot = Ballot::try_from(request.into_inner()).map_err(|e| {
            debug!(kind = "vote_rejected", error_code = e.error_code, detail = %e.detail(), remote_addr = ?remote_addr);
            Status::from(e)
        })?;

        let confirmation = ballot.confirmation();

        info!(
            kind = "vote_accepted",
            url = %ballot.url(),
            direction = %ballot.direction(),
            remote_addr = ?remote_addr,
            env = %self.state.get_deployment_environment(),
            duration = ?start.elapsed()
        );

        Ok(Response::new(VotingResponse { confirmation }))
    }
}
