use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use matchpoint_core::{GameRecord, Uid};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

/// A friends list change event: the list before and after the update.
#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FriendsUpdateSchema {
    pub before: Vec<Uid>,
    pub after: Vec<Uid>,
}

/// A game document snapshot as delivered by the change event source.
#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GameSnapshotSchema {
    #[validate(length(min = 1))]
    pub player1: Uid,
    #[validate(length(min = 1))]
    pub player2: Uid,
    pub name: String,
    #[validate(length(equal = 2))]
    pub state: String,
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GameUpdateSchema {
    #[validate(nested)]
    pub before: GameSnapshotSchema,
    #[validate(nested)]
    pub after: GameSnapshotSchema,
}

impl From<GameSnapshotSchema> for GameRecord {
    fn from(value: GameSnapshotSchema) -> Self {
        Self {
            player1: value.player1,
            player2: value.player2,
            name: value.name,
            state: value.state,
        }
    }
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "JSON parse failed"))?;

        extracted_json
            .0
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body is invalid"))?;

        Ok(Self(extracted_json.0))
    }
}
