use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The type used to identify users across the store and the identity directory.
pub type Uid = String;

/// The type used to identify games.
pub type GameId = String;

/// An opaque document revision, returned by versioned reads and required by versioned writes.
pub type Revision = String;

/// A matchpoint account profile, owned by the client app.
/// Read-only from this system's perspective, except deletion during cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: Uid,
    pub display_name: String,
    pub nickname: String,
    /// Registered push tokens keyed by platform, example: "android" -> token
    #[serde(default)]
    pub device_tokens: HashMap<String, String>,
}

/// The peers a user has added, in the order they were added.
/// Mutated by the client app; this system only reads it to detect additions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FriendsList {
    #[serde(default)]
    pub friends: Vec<Uid>,
}

impl FriendsList {
    pub fn contains(&self, uid: &str) -> bool {
        self.friends.iter().any(|f| f == uid)
    }
}

/// Pending invitations directed at a user. Stored as a sequence, but semantically
/// a set: entries are only appended after a membership check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvitationsList {
    #[serde(default)]
    pub invitations: Vec<Uid>,
}

impl InvitationsList {
    pub fn contains(&self, uid: &str) -> bool {
        self.invitations.iter().any(|i| i == uid)
    }

    /// Appends the uid if it isn't present yet. Returns whether it was inserted.
    pub fn insert(&mut self, uid: &str) -> bool {
        if self.contains(uid) {
            return false;
        }

        self.invitations.push(uid.to_string());
        true
    }
}

/// A game between two players. Mutated by the client app; this system only
/// reacts to creations and updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub player1: Uid,
    pub player2: Uid,
    pub name: String,
    /// A two-character code: first char is the acting player ('1' or '2'),
    /// second char is what they did.
    pub state: String,
}

/// The active games of a user. Append-only from this system, set semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerList {
    #[serde(default)]
    pub games: Vec<GameId>,
}

impl ManagerList {
    pub fn contains(&self, game_id: &str) -> bool {
        self.games.iter().any(|g| g == game_id)
    }

    /// Appends the game id if it isn't present yet. Returns whether it was inserted.
    pub fn insert(&mut self, game_id: &str) -> bool {
        if self.contains(game_id) {
            return false;
        }

        self.games.push(game_id.to_string());
        true
    }
}

/// A document paired with the revision it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub doc: T,
    pub revision: Revision,
}
