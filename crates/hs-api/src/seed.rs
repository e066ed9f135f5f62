//! Baseline accounts and the welcome message.
//!
//! Two entry points: [`boot`] runs on every startup (founder + system
//! account, plus drift repair on the founder row), while [`init_community`]
//! backs `GET /api/init` and additionally seeds the demo member and the
//! welcome line.

use chrono::Local;
use hs_core::ladder::EXEMPT_RANK;
use hs_core::models::{NewMessage, NewUser};
use secrecy::ExposeSecret;
use tracing::info;

use crate::state::AppState;

const SYSTEM_NICKNAME: &str = "Sistem";
const WELCOME_TEXT: &str = "Ana Salona hoş geldiniz. Burası genel toplanma alanıdır.";

/// Startup seeding: create the founder and system accounts when the
/// founder is missing; otherwise repair founder drift (rank or credential
/// changed through the admin surface).
pub async fn boot(state: &AppState) -> anyhow::Result<()> {
    let founder = state.policy.founder().to_owned();
    let founder_password = state.founder_password.expose_secret().to_owned();

    match state.users.find(&founder).await? {
        None => {
            create_missing(
                state,
                vec![
                    founder_account(&founder, &founder_password, state),
                    system_account(state),
                ],
            )
            .await?;
            info!(%founder, "base accounts seeded");
        }
        Some(mut user) => {
            let drifted = user.rank != EXEMPT_RANK
                || !state.gate.verify(&founder_password, &user.password);
            if drifted {
                user.rank = EXEMPT_RANK.to_owned();
                user.xp = 9999;
                user.password = state.gate.seal(&founder_password);
                state.users.save(&user).await?;
                info!(%founder, "founder account restored");
            }
        }
    }
    Ok(())
}

/// Idempotent community bootstrap behind `GET /api/init`: the full base
/// roster, and one welcome message when the salon is empty.
pub async fn init_community(state: &AppState) -> anyhow::Result<()> {
    let founder = state.policy.founder().to_owned();
    let founder_password = state.founder_password.expose_secret().to_owned();

    create_missing(
        state,
        vec![
            founder_account(&founder, &founder_password, state),
            system_account(state),
            NewUser {
                nickname: "Adept".into(),
                rank: "Part Lead".into(),
                xp: 800,
                most_used_word: "Sessizlik".into(),
                badges: Vec::new(),
                answers: None,
                password: state.gate.seal("adeptpassword123"),
            },
        ],
    )
    .await?;

    if state.messages.count().await? == 0 {
        state
            .messages
            .append(NewMessage {
                author: SYSTEM_NICKNAME.into(),
                text: WELCOME_TEXT.into(),
                time: Local::now().format("%H:%M").to_string(),
                is_system: true,
            })
            .await?;
        info!("welcome message seeded");
    }

    Ok(())
}

fn founder_account(founder: &str, founder_password: &str, state: &AppState) -> NewUser {
    NewUser {
        nickname: founder.to_owned(),
        rank: EXEMPT_RANK.to_owned(),
        xp: 9999,
        most_used_word: "Yönetim".into(),
        badges: vec!["Kurucu".into(), "Her Şeyi Gören".into()],
        answers: None,
        password: state.gate.seal(founder_password),
    }
}

fn system_account(state: &AppState) -> NewUser {
    NewUser {
        nickname: SYSTEM_NICKNAME.into(),
        rank: "Üstün".into(),
        xp: 9999,
        most_used_word: "Düzen".into(),
        badges: vec!["Kurucu".into()],
        answers: None,
        password: state.gate.seal("systempassword123"),
    }
}

async fn create_missing(state: &AppState, accounts: Vec<NewUser>) -> anyhow::Result<()> {
    for account in accounts {
        if state.users.find(&account.nickname).await?.is_none() {
            state.users.create(account).await?;
        }
    }
    Ok(())
}
