use axum::{extract::State, routing::post, Json};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    serialized::{CleanupResponse, ToSerialized},
    Router,
};

/// Runs one account reconciliation pass and reports the deleted uids.
async fn run_cleanup(State(context): State<ServerContext>) -> ServerResult<Json<CleanupResponse>> {
    let report = context.backend.cleanup.run().await?;

    Ok(Json(report.to_serialized()))
}

pub fn router() -> Router {
    Router::new().route("/cleanup", post(run_cleanup))
}
