use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json,
};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{FriendsUpdateSchema, GameSnapshotSchema, GameUpdateSchema, ValidatedJson},
    serialized::{PropagationResult, ToSerialized},
    Router,
};

/// A friends list document changed: propagate every detected addition.
async fn friends_updated(
    State(context): State<ServerContext>,
    Path(uid): Path<String>,
    ValidatedJson(body): ValidatedJson<FriendsUpdateSchema>,
) -> Json<Vec<PropagationResult>> {
    let outcomes = context
        .backend
        .invitations
        .on_friends_update(&uid, &body.before, &body.after)
        .await;

    Json(outcomes.to_serialized())
}

/// A game document was created.
async fn game_created(
    State(context): State<ServerContext>,
    Path(game_id): Path<String>,
    ValidatedJson(body): ValidatedJson<GameSnapshotSchema>,
) -> StatusCode {
    context.backend.games.on_game_create(&game_id, &body.into()).await;

    StatusCode::OK
}

/// A game document was updated.
async fn game_updated(
    State(context): State<ServerContext>,
    Path(game_id): Path<String>,
    ValidatedJson(body): ValidatedJson<GameUpdateSchema>,
) -> ServerResult<StatusCode> {
    context
        .backend
        .games
        .on_game_update(&game_id, &body.before.into(), &body.after.into())
        .await?;

    Ok(StatusCode::OK)
}

pub fn router() -> Router {
    Router::new()
        .route("/events/friends/:uid", post(friends_updated))
        .route("/events/games/:game_id/created", post(game_created))
        .route("/events/games/:game_id/updated", post(game_updated))
}
