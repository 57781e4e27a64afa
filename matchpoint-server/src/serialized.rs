//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from core types

use matchpoint_core::{CleanupReport, PropagationOutcome, Uid};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationResult {
    peer: Uid,
    outcome: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    deleted_uids: Vec<Uid>,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|i| i.to_serialized()).collect()
    }
}

impl ToSerialized<PropagationResult> for (Uid, PropagationOutcome) {
    fn to_serialized(&self) -> PropagationResult {
        let outcome = match self.1 {
            PropagationOutcome::Applied => "applied",
            PropagationOutcome::AlreadyFriends => "alreadyFriends",
            PropagationOutcome::AlreadyInvited => "alreadyInvited",
            PropagationOutcome::PeerMissing => "peerMissing",
            PropagationOutcome::InvitationsMissing => "invitationsMissing",
            PropagationOutcome::Failed => "failed",
        };

        PropagationResult {
            peer: self.0.clone(),
            outcome,
        }
    }
}

impl ToSerialized<CleanupResponse> for CleanupReport {
    fn to_serialized(&self) -> CleanupResponse {
        CleanupResponse {
            deleted_uids: self.deleted.clone(),
        }
    }
}
