//! # hs-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.
//! Every handler returns [`ApiResult`], so the error taxonomy maps to the
//! wire in one place ([`crate::error`]).

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use hs_core::models::{
    Archive, Message, NewArchive, NewTheory, NewUser, Reply, Theory, User, UserPatch,
};
use hs_core::{AppError, RankLadder, SalonEvent, AVAILABLE_RANKS_KEY};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::seed;
use crate::state::AppState;

// ── Request payloads ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub nickname: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nickname: String,
    pub password: String,
    #[serde(default)]
    pub answers: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRankRequest {
    pub nickname: String,
    pub new_rank: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveUserRequest {
    pub admin_nickname: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub author: String,
    pub text: String,
}

// ── Bootstrap ───────────────────────────────────────────────────────────────

/// `GET /api/init`: idempotent community bootstrap (base accounts plus the
/// welcome message).
pub async fn init(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    seed::init_community(&state).await?;
    Ok(Json(json!({ "success": true, "message": "Database Initialized" })))
}

// ── Accounts ────────────────────────────────────────────────────────────────

/// `POST /api/login`: nickname + password against the credential gate.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .find(&req.nickname)
        .await?
        .ok_or_else(|| AppError::NotFound("Böyle bir ruh kayıtlı değil.".into()))?;

    if !state.gate.verify(&req.password, &user.password) {
        return Err(AppError::WrongCredential("Ruhun şifresi uyuşmuyor.".into()).into());
    }

    Ok(Json(user))
}

/// `POST /api/register`: fresh member at the bottom of the ladder.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<User>> {
    // 1. Both fields are mandatory.
    if req.nickname.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("Takma ad ve şifre zorunludur.".into()).into());
    }

    // 2. Nicknames are unique.
    if state.users.find(&req.nickname).await?.is_some() {
        return Err(AppError::Conflict("Bu isim zaten gölgelerde fısıldanıyor.".into()).into());
    }

    // 3. Persistence: every newcomer starts as Aday with the first badge.
    let user = state
        .users
        .create(NewUser {
            nickname: req.nickname,
            rank: "Aday".into(),
            xp: 0,
            most_used_word: "Sır".into(),
            badges: vec!["İlk Adım".into()],
            answers: req.answers,
            password: state.gate.seal(&req.password),
        })
        .await?;

    info!(nickname = %user.nickname, "new member registered");
    Ok(Json(user))
}

/// `GET /api/users`: the full member roster.
pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

/// `PUT /api/users/{nickname}`: partial profile update from the admin
/// console. Raw passwords pass through the credential gate first.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(nickname): Path<String>,
    Json(mut patch): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    let mut user = state
        .users
        .find(&nickname)
        .await?
        .ok_or_else(|| AppError::NotFound("Böyle bir ruh kayıtlı değil.".into()))?;

    let sealed = patch.password.take().map(|raw| state.gate.seal(&raw));
    patch.apply(&mut user);
    if let Some(sealed) = sealed {
        user.password = sealed;
    }

    let updated = state
        .users
        .save(&user)
        .await?
        .ok_or_else(|| AppError::NotFound("Böyle bir ruh kayıtlı değil.".into()))?;

    state.bus.publish(SalonEvent::UserUpdated(updated.clone()));
    Ok(Json(updated))
}

/// `DELETE /api/users/{nickname}`: expel a member. The response reports
/// success even when the row was already gone; the salon event fires only
/// for an actual removal.
pub async fn remove_user(
    State(state): State<Arc<AppState>>,
    Path(nickname): Path<String>,
    Json(req): Json<RemoveUserRequest>,
) -> ApiResult<Json<Value>> {
    // 1. The founder is untouchable.
    if state.policy.is_protected(&nickname) {
        return Err(AppError::Forbidden("Kurucu cemiyetten atılamaz.".into()).into());
    }

    // 2. Nobody expels themselves.
    if nickname == req.admin_nickname {
        return Err(AppError::Forbidden("Kendinizi cemiyetten atamazsınız.".into()).into());
    }

    // 3. The acting account must hold the exempt rank.
    let authorized = state
        .users
        .find(&req.admin_nickname)
        .await?
        .is_some_and(|actor| state.policy.may_remove_members(&actor));
    if !authorized {
        return Err(AppError::Forbidden("Bu işlem için yetkiniz yok.".into()).into());
    }

    if state.users.delete(&nickname).await? {
        info!(%nickname, admin = %req.admin_nickname, "member removed");
        state.bus.publish(SalonEvent::UserRemoved(nickname));
    }

    Ok(Json(json!({ "success": true })))
}

/// `POST /api/users/{nickname}/avatar`: multipart avatar upload, stored
/// through the media port and linked on the profile.
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Path(nickname): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<User>> {
    let (data, original_name) = read_upload(multipart, "avatar").await?;
    let uri = state.media.save_upload(data, &original_name).await?;

    let mut user = state
        .users
        .find(&nickname)
        .await?
        .ok_or_else(|| AppError::NotFound("Böyle bir ruh kayıtlı değil.".into()))?;
    user.avatar = Some(uri);

    let updated = state
        .users
        .save(&user)
        .await?
        .ok_or_else(|| AppError::NotFound("Böyle bir ruh kayıtlı değil.".into()))?;

    state.bus.publish(SalonEvent::UserUpdated(updated.clone()));
    Ok(Json(updated))
}

// ── Ranks ───────────────────────────────────────────────────────────────────

/// `GET /api/ranks`: the ladder in ascending order, seeding the default on
/// first contact.
pub async fn list_ranks(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let ladder = RankLadder::load_or_seed(state.settings.as_ref()).await?;
    Ok(Json(ladder.ranks_in_order().to_vec()))
}

/// `POST /api/ranks`: founder-only append to the top of the ladder.
pub async fn mint_rank(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MintRankRequest>,
) -> ApiResult<Json<Vec<String>>> {
    // 1. Policy: only the founder mints ranks.
    if !state.policy.may_mint_ranks(&req.nickname) {
        return Err(AppError::Forbidden("Sadece kurucu rütbe yaratabilir.".into()).into());
    }

    // 2. Append-or-reject, then persist the grown ladder.
    let mut ladder = RankLadder::load_or_seed(state.settings.as_ref()).await?;
    ladder.append(req.new_rank).map_err(AppError::from)?;
    state
        .settings
        .put(AVAILABLE_RANKS_KEY, &ladder.to_value())
        .await?;

    info!(version = ladder.version(), "rank ladder extended");
    Ok(Json(ladder.ranks_in_order().to_vec()))
}

// ── Salon ───────────────────────────────────────────────────────────────────

/// `GET /api/messages`: salon history, oldest first.
pub async fn list_messages(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(state.messages.list().await?))
}

/// `DELETE /api/messages`: admin wipe of the salon history.
pub async fn clear_messages(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let removed = state.messages.clear().await?;
    state.bus.publish(SalonEvent::MessagesCleared);

    info!(removed, "salon history cleared");
    Ok(Json(json!({ "success": true, "message": "All messages cleared" })))
}

// ── Archive ─────────────────────────────────────────────────────────────────

/// `GET /api/archives`: stored images, newest first.
pub async fn list_archives(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Archive>>> {
    Ok(Json(state.archives.list().await?))
}

/// `POST /api/archives`: multipart upload of a new archive entry
/// (`title`, `uploader` and the `archiveImage` file).
pub async fn create_archive(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<Archive>> {
    let mut title = None;
    let mut uploader = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(err.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("title") => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| AppError::Validation(err.to_string()))?,
                );
            }
            Some("uploader") => {
                uploader = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| AppError::Validation(err.to_string()))?,
                );
            }
            Some("archiveImage") => {
                let original = field
                    .file_name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| fallback_name(field.content_type()));
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::Validation(err.to_string()))?;
                image = Some((data, original));
            }
            _ => {}
        }
    }

    let (data, original) = image.ok_or_else(|| AppError::Validation("Dosya seçilmedi".into()))?;
    let image_url = state.media.save_upload(data, &original).await?;

    let entry = state
        .archives
        .create(NewArchive {
            title: title.unwrap_or_default(),
            uploader: uploader.unwrap_or_default(),
            image_url: Some(image_url),
        })
        .await?;

    info!(id = entry.id, uploader = %entry.uploader, "archive entry stored");
    Ok(Json(entry))
}

/// `DELETE /api/archives/{id}`: drop one archive entry.
pub async fn delete_archive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    if !state.archives.delete(id).await? {
        return Err(AppError::NotFound("Kayıt bulunamadı.".into()).into());
    }
    Ok(Json(json!({ "success": true, "message": "Arşiv kaydı silindi." })))
}

// ── Theories ────────────────────────────────────────────────────────────────

/// `GET /api/theories`: every theory with its embedded replies.
pub async fn list_theories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Theory>>> {
    Ok(Json(state.theories.list().await?))
}

/// `POST /api/theories`: publish a new theory.
pub async fn create_theory(
    State(state): State<Arc<AppState>>,
    Json(new_theory): Json<NewTheory>,
) -> ApiResult<Json<Theory>> {
    Ok(Json(state.theories.create(new_theory).await?))
}

/// `POST /api/theories/{id}/like`: one more like, no dedup.
pub async fn like_theory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Theory>> {
    let theory = state
        .theories
        .like(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".into()))?;
    Ok(Json(theory))
}

/// `POST /api/theories/{id}/reply`: append a reply, stamped server-side.
pub async fn reply_theory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> ApiResult<Json<Theory>> {
    let reply = Reply {
        author: req.author,
        text: req.text,
        date: Utc::now(),
    };
    let theory = state
        .theories
        .add_reply(id, reply)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".into()))?;
    Ok(Json(theory))
}

// ── Multipart plumbing ──────────────────────────────────────────────────────

/// Pulls the named file field out of a multipart body.
async fn read_upload(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<(Bytes, String), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(err.to_string()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let original = field
            .file_name()
            .map(str::to_owned)
            .unwrap_or_else(|| fallback_name(field.content_type()));
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::Validation(err.to_string()))?;
        return Ok((data, original));
    }
    Err(AppError::Validation("Dosya seçilmedi".into()).into())
}

/// Synthetic file name for uploads that arrive without one; the media
/// store only reads the extension.
fn fallback_name(content_type: Option<&str>) -> String {
    let ext = content_type
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("bin");
    format!("upload.{ext}")
}
