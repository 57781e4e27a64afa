use std::sync::Arc;

use log::{error, info, warn};
use thiserror::Error;

use crate::{
    dispatch::NotificationDispatcher,
    push::{Notification, PushSender},
    store::{DocumentStore, GameRecord, Uid, Versioned},
};

const CONFLICT_RETRY_CAP: usize = 3;

#[derive(Debug, Error)]
pub enum GameError {
    /// The two-character state code could not be parsed. Aborts this event only.
    #[error("unrecognized game state code {0:?}")]
    MalformedState(String),
}

/// What the acting player did, taken from the second character of the state code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    Declined,
    Played,
    Won,
    Lost,
}

impl GameAction {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'D' => Some(Self::Declined),
            'P' => Some(Self::Played),
            'W' => Some(Self::Won),
            'L' => Some(Self::Lost),
            _ => None,
        }
    }

    fn describe(&self, actor: &str, game: &str) -> (String, String) {
        match self {
            Self::Declined => (
                "Invitation declined".to_string(),
                format!("{actor} declined to play {game}"),
            ),
            Self::Played => (
                "Your turn".to_string(),
                format!("{actor} played their turn in {game}"),
            ),
            Self::Won => ("Game over".to_string(), format!("{actor} won {game}")),
            Self::Lost => ("Game over".to_string(), format!("{actor} lost {game}")),
        }
    }
}

/// A parsed state code: who acted, who should hear about it, and what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StateChange {
    actor: Uid,
    target: Uid,
    action: GameAction,
}

fn parse_state(game: &GameRecord) -> Result<StateChange, GameError> {
    let malformed = || GameError::MalformedState(game.state.clone());

    let mut chars = game.state.chars();
    let who = chars.next().ok_or_else(malformed)?;
    let what = chars.next().ok_or_else(malformed)?;

    let (actor, target) = match who {
        '1' => (&game.player1, &game.player2),
        '2' => (&game.player2, &game.player1),
        _ => return Err(malformed()),
    };

    let action = GameAction::from_code(what).ok_or_else(malformed)?;

    Ok(StateChange {
        actor: actor.clone(),
        target: target.clone(),
        action,
    })
}

/// Reacts to game document creations and updates: keeps both players' manager
/// lists current and fans out the matching pushes.
pub struct GameEvents<S, P> {
    store: Arc<S>,
    dispatcher: NotificationDispatcher<S, P>,
}

impl<S, P> GameEvents<S, P>
where
    S: DocumentStore,
    P: PushSender,
{
    pub fn new(store: &Arc<S>, sender: &Arc<P>) -> Self {
        Self {
            store: store.clone(),
            dispatcher: NotificationDispatcher::new(store, sender),
        }
    }

    /// A game document was created: track it on both players' manager lists
    /// and let player2 know they were challenged.
    pub async fn on_game_create(&self, game_id: &str, game: &GameRecord) {
        for player in [&game.player1, &game.player2] {
            self.track_game(player, game_id).await;
        }

        let inviter = self.display_name(&game.player1).await;

        let notification = Notification::new(
            "New game",
            format!("{inviter} challenged you to {}", game.name),
        )
        .with_data("gameId", game_id);

        self.dispatcher.notify(&game.player2, notification).await;
    }

    /// A game document was updated: act once on the state delta, notifying the
    /// player on the receiving end of the new state code.
    pub async fn on_game_update(
        &self,
        game_id: &str,
        before: &GameRecord,
        after: &GameRecord,
    ) -> Result<(), GameError> {
        if before.state == after.state {
            info!("games/{game_id} update changed nothing relevant, skipping");
            return Ok(());
        }

        let change = parse_state(after)?;

        let actor = self.display_name(&change.actor).await;
        let (title, body) = change.action.describe(&actor, &after.name);

        let notification = Notification::new(title, body).with_data("gameId", game_id);
        self.dispatcher.notify(&change.target, notification).await;

        Ok(())
    }

    /// Appends the game to the player's manager list, set semantics, revision
    /// checked. Missing documents and store failures only affect this player.
    async fn track_game(&self, player: &str, game_id: &str) {
        for _ in 0..CONFLICT_RETRY_CAP {
            let Versioned { mut doc, revision } = match self.store.managers_by_id(player).await {
                Ok(versioned) => versioned,
                Err(e) if e.is_not_found() => {
                    info!("managers/{player} doesn't exist, not tracking {game_id}");
                    return;
                }
                Err(e) => {
                    error!("could not read managers/{player}: {e}");
                    return;
                }
            };

            if !doc.insert(game_id) {
                info!("managers/{player} already tracks {game_id}");
                return;
            }

            match self.store.update_managers(player, &doc, &revision).await {
                Ok(()) => {
                    info!("managers/{player} now tracks {game_id}");
                    return;
                }
                Err(e) if e.is_conflict() => {
                    warn!("managers/{player} changed under us, retrying");
                    continue;
                }
                Err(e) => {
                    error!("could not update managers/{player}: {e}");
                    return;
                }
            }
        }

        error!("managers/{player} kept conflicting, giving up on {game_id}");
    }

    async fn display_name(&self, uid: &str) -> String {
        self.store
            .user_by_id(uid)
            .await
            .map(|u| u.display_name)
            .unwrap_or_else(|_| uid.to_string())
    }
}
