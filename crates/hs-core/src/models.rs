//! # Domain Models
//!
//! Core entities of the Hemsaye community. Wire representation is
//! camelCase because the existing frontend consumes these payloads
//! verbatim (`mostUsedWord`, `isSystem`, `replyList`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered member of the community.
///
/// `rank` stays consistent with `xp` under the ladder thresholds unless an
/// admin override set it directly, or the member holds the exempt rank,
/// which never auto-promotes or auto-demotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Identity key, unique across the community.
    pub nickname: String,
    pub rank: String,
    /// Non-negative; monotonically non-decreasing except via admin override.
    pub xp: i64,
    pub join_date: DateTime<Utc>,
    pub most_used_word: String,
    /// Unordered badge set; append-only in normal operation.
    pub badges: Vec<String>,
    /// Free-form sign-up questionnaire answers.
    pub answers: Option<serde_json::Value>,
    pub avatar: Option<String>,
    /// Opaque credential. Accepted on input and compared by the credential
    /// gate; never serialized back out.
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// Insert payload for a new user row. `id`, `join_date` and `avatar` are
/// assigned by the record store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nickname: String,
    pub rank: String,
    pub xp: i64,
    pub most_used_word: String,
    pub badges: Vec<String>,
    pub answers: Option<serde_json::Value>,
    pub password: String,
}

/// Partial profile update applied by `PUT /api/users/{nickname}`.
/// Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub rank: Option<String>,
    pub xp: Option<i64>,
    pub most_used_word: Option<String>,
    pub badges: Option<Vec<String>>,
    pub avatar: Option<String>,
    pub password: Option<String>,
    pub answers: Option<serde_json::Value>,
}

impl UserPatch {
    /// Folds the patch into a stored row. An admin may set any rank or xp
    /// here regardless of the ladder thresholds; that is the documented
    /// override path.
    pub fn apply(self, user: &mut User) {
        if let Some(rank) = self.rank {
            user.rank = rank;
        }
        if let Some(xp) = self.xp {
            user.xp = xp;
        }
        if let Some(word) = self.most_used_word {
            user.most_used_word = word;
        }
        if let Some(badges) = self.badges {
            user.badges = badges;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(answers) = self.answers {
            user.answers = Some(answers);
        }
    }
}

/// One chat line in the salon. Immutable once created; removed only by the
/// bulk admin clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Row id; doubles as the creation order.
    pub id: i64,
    /// Weak nickname reference — the author row is not required to exist.
    pub author: String,
    pub text: String,
    /// Display-formatted wall-clock stamp ("HH:MM"); never used for ordering.
    pub time: String,
    pub is_system: bool,
}

/// Insert payload for a chat line.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub author: String,
    pub text: String,
    pub time: String,
    pub is_system: bool,
}

/// A discussion thread on the theories board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theory {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub likes: i64,
    /// Denormalized for the frontend; kept equal to `reply_list.len()`.
    pub replies: i64,
    pub reply_list: Vec<Reply>,
}

/// One reply inside a theory's ordered reply list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub author: String,
    pub text: String,
    /// RFC3339 on the wire; the frontend parses it with `new Date(...)`.
    pub date: DateTime<Utc>,
}

/// Creation payload for a theory; doubles as the POST body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTheory {
    pub title: String,
    pub content: String,
    pub author: String,
}

/// One entry in the image archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    pub id: i64,
    pub title: String,
    pub uploader: String,
    pub image_url: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// Insert payload for an archive entry.
#[derive(Debug, Clone)]
pub struct NewArchive {
    pub title: String,
    pub uploader: String,
    pub image_url: Option<String>,
}
