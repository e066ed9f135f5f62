//! # hs-db-sqlite Implementation
//!
//! Data mapping between the SQLite relational model and the `hs-core`
//! domain models. One [`SqliteStore`] owns the pool and implements every
//! record-store port, so the binary wires a single value into all of them.
//!
//! List-valued fields (`badges`, `reply_list`, `answers`) are stored as
//! JSON TEXT columns; timestamps as RFC3339 TEXT.

use async_trait::async_trait;
use chrono::Utc;
use hs_core::models::{
    Archive, Message, NewArchive, NewMessage, NewTheory, NewUser, Reply, Theory, User,
};
use hs_core::traits::{ArchiveRepo, MessageRepo, SettingsRepo, TheoryRepo, UserRepo};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname        TEXT NOT NULL UNIQUE,
    password        TEXT NOT NULL,
    rank            TEXT NOT NULL,
    xp              INTEGER NOT NULL DEFAULT 0,
    join_date       TEXT NOT NULL,
    most_used_word  TEXT NOT NULL DEFAULT '',
    badges          TEXT NOT NULL DEFAULT '[]',
    answers         TEXT,
    avatar          TEXT
);
CREATE TABLE IF NOT EXISTS messages (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    author    TEXT NOT NULL,
    text      TEXT NOT NULL,
    time      TEXT NOT NULL,
    is_system INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS theories (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    author     TEXT NOT NULL,
    likes      INTEGER NOT NULL DEFAULT 0,
    replies    INTEGER NOT NULL DEFAULT 0,
    reply_list TEXT NOT NULL DEFAULT '[]'
);
CREATE TABLE IF NOT EXISTS archives (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT NOT NULL,
    uploader   TEXT NOT NULL,
    image_url  TEXT,
    date_added TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS settings (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        info!(url, "sqlite store ready");
        Ok(Self { pool })
    }

    /// Fresh in-memory database. The pool is pinned to one connection that
    /// never expires; SQLite drops a `:memory:` database with its
    /// connection.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

fn map_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        nickname: row.get("nickname"),
        rank: row.get("rank"),
        xp: row.get("xp"),
        join_date: row.get("join_date"),
        most_used_word: row.get("most_used_word"),
        badges: serde_json::from_str(&row.get::<String, _>("badges")).unwrap_or_default(),
        answers: row
            .get::<Option<String>, _>("answers")
            .and_then(|s| serde_json::from_str(&s).ok()),
        avatar: row.get("avatar"),
        password: row.get("password"),
    }
}

fn map_message(row: &SqliteRow) -> Message {
    Message {
        id: row.get("id"),
        author: row.get("author"),
        text: row.get("text"),
        time: row.get("time"),
        is_system: row.get("is_system"),
    }
}

fn map_theory(row: &SqliteRow) -> Theory {
    Theory {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author: row.get("author"),
        likes: row.get("likes"),
        replies: row.get("replies"),
        reply_list: serde_json::from_str(&row.get::<String, _>("reply_list")).unwrap_or_default(),
    }
}

fn map_archive(row: &SqliteRow) -> Archive {
    Archive {
        id: row.get("id"),
        title: row.get("title"),
        uploader: row.get("uploader"),
        image_url: row.get("image_url"),
        date_added: row.get("date_added"),
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn find(&self, nickname: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE nickname = ?")
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_user).collect())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let join_date = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (nickname, password, rank, xp, join_date, most_used_word, badges, answers) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.nickname)
        .bind(&user.password)
        .bind(&user.rank)
        .bind(user.xp)
        .bind(join_date)
        .bind(&user.most_used_word)
        .bind(serde_json::to_string(&user.badges)?)
        .bind(user.answers.as_ref().map(Value::to_string))
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            nickname: user.nickname,
            rank: user.rank,
            xp: user.xp,
            join_date,
            most_used_word: user.most_used_word,
            badges: user.badges,
            answers: user.answers,
            avatar: None,
            password: user.password,
        })
    }

    async fn save(&self, user: &User) -> anyhow::Result<Option<User>> {
        let affected = sqlx::query(
            "UPDATE users SET password = ?, rank = ?, xp = ?, most_used_word = ?, badges = ?, \
             answers = ?, avatar = ? WHERE nickname = ?",
        )
        .bind(&user.password)
        .bind(&user.rank)
        .bind(user.xp)
        .bind(&user.most_used_word)
        .bind(serde_json::to_string(&user.badges)?)
        .bind(user.answers.as_ref().map(Value::to_string))
        .bind(&user.avatar)
        .bind(&user.nickname)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Ok(None);
        }
        self.find(&user.nickname).await
    }

    async fn update_progress(
        &self,
        nickname: &str,
        xp: i64,
        rank: &str,
    ) -> anyhow::Result<Option<User>> {
        let affected = sqlx::query("UPDATE users SET xp = ?, rank = ? WHERE nickname = ?")
            .bind(xp)
            .bind(rank)
            .bind(nickname)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Ok(None);
        }
        self.find(nickname).await
    }

    async fn delete(&self, nickname: &str) -> anyhow::Result<bool> {
        let affected = sqlx::query("DELETE FROM users WHERE nickname = ?")
            .bind(nickname)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}

#[async_trait]
impl MessageRepo for SqliteStore {
    async fn append(&self, message: NewMessage) -> anyhow::Result<Message> {
        let result =
            sqlx::query("INSERT INTO messages (author, text, time, is_system) VALUES (?, ?, ?, ?)")
                .bind(&message.author)
                .bind(&message.text)
                .bind(&message.time)
                .bind(message.is_system)
                .execute(&self.pool)
                .await?;

        Ok(Message {
            id: result.last_insert_rowid(),
            author: message.author,
            text: message.text,
            time: message.time,
            is_system: message.is_system,
        })
    }

    async fn list(&self) -> anyhow::Result<Vec<Message>> {
        let rows = sqlx::query("SELECT * FROM messages ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_message).collect())
    }

    async fn clear(&self) -> anyhow::Result<u64> {
        let affected = sqlx::query("DELETE FROM messages")
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

#[async_trait]
impl TheoryRepo for SqliteStore {
    async fn list(&self) -> anyhow::Result<Vec<Theory>> {
        let rows = sqlx::query("SELECT * FROM theories ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_theory).collect())
    }

    async fn create(&self, theory: NewTheory) -> anyhow::Result<Theory> {
        let result = sqlx::query(
            "INSERT INTO theories (title, content, author, likes, replies, reply_list) \
             VALUES (?, ?, ?, 0, 0, '[]')",
        )
        .bind(&theory.title)
        .bind(&theory.content)
        .bind(&theory.author)
        .execute(&self.pool)
        .await?;

        Ok(Theory {
            id: result.last_insert_rowid(),
            title: theory.title,
            content: theory.content,
            author: theory.author,
            likes: 0,
            replies: 0,
            reply_list: Vec::new(),
        })
    }

    async fn like(&self, id: i64) -> anyhow::Result<Option<Theory>> {
        let affected = sqlx::query("UPDATE theories SET likes = likes + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Ok(None);
        }
        let row = sqlx::query("SELECT * FROM theories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_theory))
    }

    /// Read-modify-write under a transaction; the `replies` counter always
    /// lands equal to the stored list's length.
    async fn add_reply(&self, id: i64, reply: Reply) -> anyhow::Result<Option<Theory>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM theories WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut theory = map_theory(&row);
        theory.reply_list.push(reply);
        theory.replies = theory.reply_list.len() as i64;

        sqlx::query("UPDATE theories SET replies = ?, reply_list = ? WHERE id = ?")
            .bind(theory.replies)
            .bind(serde_json::to_string(&theory.reply_list)?)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(theory))
    }
}

#[async_trait]
impl ArchiveRepo for SqliteStore {
    async fn list(&self) -> anyhow::Result<Vec<Archive>> {
        let rows = sqlx::query("SELECT * FROM archives ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_archive).collect())
    }

    async fn create(&self, archive: NewArchive) -> anyhow::Result<Archive> {
        let date_added = Utc::now();
        let result = sqlx::query(
            "INSERT INTO archives (title, uploader, image_url, date_added) VALUES (?, ?, ?, ?)",
        )
        .bind(&archive.title)
        .bind(&archive.uploader)
        .bind(&archive.image_url)
        .bind(date_added)
        .execute(&self.pool)
        .await?;

        Ok(Archive {
            id: result.last_insert_rowid(),
            title: archive.title,
            uploader: archive.uploader,
            image_url: archive.image_url,
            date_added,
        })
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let affected = sqlx::query("DELETE FROM archives WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}

#[async_trait]
impl SettingsRepo for SqliteStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let stored = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stored.and_then(|s| serde_json::from_str(&s).ok()))
    }

    async fn put(&self, key: &str, value: &Value) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_user(nickname: &str) -> NewUser {
        NewUser {
            nickname: nickname.into(),
            rank: "Aday".into(),
            xp: 0,
            most_used_word: String::new(),
            badges: Vec::new(),
            answers: None,
            password: "parola".into(),
        }
    }

    #[tokio::test]
    async fn create_and_find_round_trips_a_user() {
        let store = SqliteStore::in_memory().await.unwrap();

        let mut user = new_user("Nev");
        user.badges = vec!["İlk Adım".into()];
        user.answers = Some(json!({"neden": "merak"}));
        let created = UserRepo::create(&store, user).await.unwrap();
        assert!(created.id > 0);

        let found = store.find("Nev").await.unwrap().expect("user exists");
        assert_eq!(found.nickname, "Nev");
        assert_eq!(found.rank, "Aday");
        assert_eq!(found.badges, vec!["İlk Adım".to_string()]);
        assert_eq!(found.answers, Some(json!({"neden": "merak"})));
        assert_eq!(found.password, "parola");
        assert!(store.find("Kimse").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_nickname_violates_unique_constraint() {
        let store = SqliteStore::in_memory().await.unwrap();
        UserRepo::create(&store, new_user("Nev")).await.unwrap();
        assert!(UserRepo::create(&store, new_user("Nev")).await.is_err());
    }

    #[tokio::test]
    async fn update_progress_writes_xp_and_rank() {
        let store = SqliteStore::in_memory().await.unwrap();
        UserRepo::create(&store, new_user("Nev")).await.unwrap();

        let updated = store
            .update_progress("Nev", 110, "Üye")
            .await
            .unwrap()
            .expect("user exists");
        assert_eq!(updated.xp, 110);
        assert_eq!(updated.rank, "Üye");

        assert!(store
            .update_progress("Kimse", 10, "Üye")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn save_returns_none_for_missing_user() {
        let store = SqliteStore::in_memory().await.unwrap();
        let ghost = User {
            id: 99,
            nickname: "Hayalet".into(),
            rank: "Aday".into(),
            xp: 0,
            join_date: Utc::now(),
            most_used_word: String::new(),
            badges: Vec::new(),
            answers: None,
            avatar: None,
            password: "x".into(),
        };
        assert!(store.save(&ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let store = SqliteStore::in_memory().await.unwrap();
        UserRepo::create(&store, new_user("Nev")).await.unwrap();
        assert!(UserRepo::delete(&store, "Nev").await.unwrap());
        assert!(!UserRepo::delete(&store, "Nev").await.unwrap());
    }

    #[tokio::test]
    async fn messages_list_in_insertion_order_and_clear_counts() {
        let store = SqliteStore::in_memory().await.unwrap();
        for text in ["ilk", "ikinci"] {
            store
                .append(NewMessage {
                    author: "Nev".into(),
                    text: text.into(),
                    time: "09:00".into(),
                    is_system: false,
                })
                .await
                .unwrap();
        }

        let listed = MessageRepo::list(&store).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].text, "ilk");
        assert_eq!(listed[1].text, "ikinci");
        assert!(listed[0].id < listed[1].id);

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn theory_counters_follow_likes_and_replies() {
        let store = SqliteStore::in_memory().await.unwrap();
        let theory = TheoryRepo::create(
            &store,
            NewTheory {
                title: "Gölge".into(),
                content: "Bir fikir".into(),
                author: "Nev".into(),
            },
        )
        .await
        .unwrap();

        let liked = store.like(theory.id).await.unwrap().expect("exists");
        assert_eq!(liked.likes, 1);

        for text in ["katılıyorum", "şüpheliyim"] {
            store
                .add_reply(
                    theory.id,
                    Reply {
                        author: "Adept".into(),
                        text: text.into(),
                        date: Utc::now(),
                    },
                )
                .await
                .unwrap();
        }

        let listed = TheoryRepo::list(&store).await.unwrap();
        assert_eq!(listed[0].replies, 2);
        assert_eq!(listed[0].reply_list.len(), 2);
        assert_eq!(listed[0].reply_list[1].text, "şüpheliyim");
    }

    #[tokio::test]
    async fn liking_a_missing_theory_is_none() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.like(404).await.unwrap().is_none());
        assert!(store
            .add_reply(
                404,
                Reply {
                    author: "Nev".into(),
                    text: "kimse yok".into(),
                    date: Utc::now(),
                },
            )
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn archives_list_newest_first() {
        let store = SqliteStore::in_memory().await.unwrap();
        for title in ["eski", "yeni"] {
            ArchiveRepo::create(
                &store,
                NewArchive {
                    title: title.into(),
                    uploader: "Nev".into(),
                    image_url: Some("http://localhost:3001/uploads/x.png".into()),
                },
            )
            .await
            .unwrap();
        }

        let listed = ArchiveRepo::list(&store).await.unwrap();
        assert_eq!(listed[0].title, "yeni");
        assert_eq!(listed[1].title, "eski");

        assert!(ArchiveRepo::delete(&store, listed[0].id).await.unwrap());
        assert!(!ArchiveRepo::delete(&store, listed[0].id).await.unwrap());
    }

    #[tokio::test]
    async fn settings_overwrite_in_place() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.get("availableRanks").await.unwrap().is_none());

        store
            .put("availableRanks", &json!(["Aday", "Üye"]))
            .await
            .unwrap();
        store
            .put("availableRanks", &json!(["Aday", "Üye", "Üstün"]))
            .await
            .unwrap();

        let stored = store.get("availableRanks").await.unwrap().unwrap();
        assert_eq!(stored, json!(["Aday", "Üye", "Üstün"]));
    }
}
