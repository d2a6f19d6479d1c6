use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use shared::domain::{Person, PersonId, ScoreId, ScoreRecord};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_person(&self, name: &str, email: &str) -> Result<PersonId> {
        let rec = sqlx::query("INSERT INTO people (name, email) VALUES (?, ?) RETURNING id")
            .bind(name)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(PersonId(rec.get::<i64, _>(0)))
    }

    /// Compensating action used only when initializing the paired score row
    /// fails after the person row was inserted.
    pub async fn delete_person(&self, person_id: PersonId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM people WHERE id = ?")
            .bind(person_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Creates the score row for a person if it does not exist yet. Safe to
    /// call more than once; an existing row is left untouched.
    pub async fn create_initial_score(&self, person_id: PersonId) -> Result<ScoreId> {
        let rec = sqlx::query(
            "INSERT INTO scores (person_id) VALUES (?)
             ON CONFLICT(person_id) DO UPDATE SET person_id=excluded.person_id
             RETURNING id",
        )
        .bind(person_id.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(ScoreId(rec.get::<i64, _>(0)))
    }

    /// Fetches the full identity row, including the registration timestamp.
    pub async fn get_person(&self, person_id: PersonId) -> Result<Option<Person>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM people WHERE id = ?")
            .bind(person_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Person {
            person_id: PersonId(r.get::<i64, _>(0)),
            name: r.get::<String, _>(1),
            email: r.get::<String, _>(2),
            created_at: r.get::<DateTime<Utc>, _>(3),
        }))
    }

    /// Resolves the newest person id for a registered (name, email) pair.
    /// This is the session re-identification lookup driven by the cookies.
    pub async fn find_person_id(&self, name: &str, email: &str) -> Result<Option<PersonId>> {
        let row = sqlx::query(
            "SELECT id FROM people WHERE name = ? AND email = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| PersonId(r.get::<i64, _>(0))))
    }

    pub async fn upsert_meeting_two_score(&self, person_id: PersonId, score: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO scores (person_id, meeting_two_score, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(person_id) DO UPDATE SET
                meeting_two_score = excluded.meeting_two_score,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(person_id.0)
        .bind(score)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Writes the raw essay text together with its graded 1-3 score in a
    /// single upsert, matching the one-row-per-person constraint.
    pub async fn upsert_essay(&self, person_id: PersonId, essay: &str, graded: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO scores (person_id, essay_answer, meeting_three_score, updated_at)
             VALUES (?, ?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(person_id) DO UPDATE SET
                essay_answer = excluded.essay_answer,
                meeting_three_score = excluded.meeting_three_score,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(person_id.0)
        .bind(essay)
        .bind(graded)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_motivation(&self, person_id: PersonId, text: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO scores (person_id, motivation_answer, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(person_id) DO UPDATE SET
                motivation_answer = excluded.motivation_answer,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(person_id.0)
        .bind(text)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_score(&self, person_id: PersonId) -> Result<Option<ScoreRecord>> {
        let row = sqlx::query(
            "SELECT meeting_two_score, meeting_three_score, essay_answer, motivation_answer
             FROM scores
             WHERE person_id = ?",
        )
        .bind(person_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| ScoreRecord {
            meeting_two_score: r.get::<Option<i64>, _>(0),
            meeting_three_score: r.get::<Option<i64>, _>(1),
            essay_answer: r.get::<Option<String>, _>(2),
            motivation_answer: r.get::<Option<String>, _>(3),
        }))
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
