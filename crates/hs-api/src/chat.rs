//! Chat delivery pipeline: persist the line, progress the author, then
//! fan both results out on the salon bus.
//!
//! Progression serializes per nickname. Two messages from the same author
//! racing through `find -> advance -> update_progress` would otherwise
//! both read the same starting xp and the second write would swallow the
//! first gain.

use std::sync::Arc;

use chrono::Local;
use dashmap::DashMap;
use hs_core::models::{Message, NewMessage, User};
use hs_core::{advance, RankLadder, SalonEvent};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::state::AppState;

/// One async mutex per nickname, created on first use. Entries are never
/// reclaimed; the roster is small and bounded by registered members.
#[derive(Clone, Default)]
pub struct ProgressionLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ProgressionLocks {
    pub fn for_nickname(&self, nickname: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(nickname.to_owned())
            .or_default()
            .value()
            .clone()
    }
}

/// Persists a chat line, advances its author, and publishes
/// `message_received` followed by `user_updated`.
///
/// Progression is best-effort: once the message row is durable it is
/// always broadcast, even when the author lookup or xp write fails, and
/// no rank/xp update happens that round. Unknown authors are skipped
/// silently; the author field is a weak reference.
pub async fn deliver(state: &AppState, author: String, text: String) -> anyhow::Result<Message> {
    let time = Local::now().format("%H:%M").to_string();
    let message = state
        .messages
        .append(NewMessage {
            author: author.clone(),
            text,
            time,
            is_system: false,
        })
        .await?;

    let advanced = match progress_author(state, &author).await {
        Ok(user) => user,
        Err(err) => {
            warn!(%author, error = ?err, "progression failed; message already durable");
            None
        }
    };

    state.bus.publish(SalonEvent::MessageReceived(message.clone()));
    if let Some(user) = advanced {
        state.bus.publish(SalonEvent::UserUpdated(user));
    }

    Ok(message)
}

/// Read-advance-write under the author's lock. Returns the stored row
/// after the write, or None when the author has no account.
async fn progress_author(state: &AppState, author: &str) -> anyhow::Result<Option<User>> {
    let lock = state.progression.for_nickname(author);
    let _guard = lock.lock().await;

    let Some(user) = state.users.find(author).await? else {
        debug!(%author, "message from unregistered author; no progression");
        return Ok(None);
    };

    // Loaded fresh each round so a freshly minted rank applies without a
    // restart.
    let ladder = RankLadder::load_or_seed(state.settings.as_ref()).await?;
    let step = advance(&user, state.xp_per_message, &ladder);
    state.users.update_progress(author, step.xp, &step.rank).await
}
