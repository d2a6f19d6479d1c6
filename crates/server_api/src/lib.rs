//! Persistence-facing operations behind the HTTP handlers. Each operation
//! resolves the caller's identity from the session cookies first, then
//! performs its writes through the retry wrapper.

use std::sync::Arc;

use grading::EssayGrader;
use shared::{
    classify::classify,
    domain::{MarketerType, PersonId, ScoreRecord, SessionIdentity},
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::{error, info};

pub mod retry;

use retry::with_retry;

pub const MEETING_TWO_MAX: i64 = 7;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub grader: Arc<dyn EssayGrader>,
}

/// Creates the person row plus its empty score row. If the score insert
/// fails the person row is deleted again so registration is all-or-nothing.
pub async fn register_person(
    ctx: &ApiContext,
    name: &str,
    email: &str,
) -> Result<PersonId, ApiError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "name and email are required",
        ));
    }

    let person_id = ctx
        .storage
        .create_person(name, email)
        .await
        .map_err(internal)?;

    if let Err(score_error) = ctx.storage.create_initial_score(person_id).await {
        error!(%score_error, person_id = person_id.0, "initial score insert failed, rolling back person");
        if let Err(rollback_error) = ctx.storage.delete_person(person_id).await {
            error!(%rollback_error, person_id = person_id.0, "compensating person delete failed");
        }
        return Err(internal(score_error));
    }

    info!(person_id = person_id.0, "registered new participant");
    Ok(person_id)
}

/// Re-resolves the person id from the session-identity cookie pair. All
/// score operations short-circuit here when the cookies are missing or no
/// registered person matches them.
pub async fn resolve_person(
    ctx: &ApiContext,
    identity: Option<&SessionIdentity>,
) -> Result<PersonId, ApiError> {
    let Some(identity) = identity else {
        return Err(ApiError::new(
            ErrorCode::Unauthorized,
            "session identity cookies are missing",
        ));
    };

    ctx.storage
        .find_person_id(&identity.name, &identity.email)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            ApiError::new(
                ErrorCode::Unauthorized,
                "no registered person matches the session identity",
            )
        })
}

pub async fn save_meeting_two_score(
    ctx: &ApiContext,
    identity: Option<&SessionIdentity>,
    score: i64,
) -> Result<(), ApiError> {
    if !(0..=MEETING_TWO_MAX).contains(&score) {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("meeting-two score must be between 0 and {MEETING_TWO_MAX}"),
        ));
    }
    let person_id = resolve_person(ctx, identity).await?;

    let storage = ctx.storage.clone();
    with_retry("meeting_two_score", || {
        let storage = storage.clone();
        async move { storage.upsert_meeting_two_score(person_id, score).await }
    })
    .await
    .map_err(internal)?;

    info!(person_id = person_id.0, score, "meeting-two score saved");
    Ok(())
}

/// Grades the essay (1-3) and persists text plus grade in one upsert.
/// Returns the grade that was written.
pub async fn save_essay_feedback(
    ctx: &ApiContext,
    identity: Option<&SessionIdentity>,
    essay: &str,
) -> Result<u8, ApiError> {
    if essay.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "essay must not be empty"));
    }
    let person_id = resolve_person(ctx, identity).await?;

    let graded = ctx.grader.grade(essay).await;

    let storage = ctx.storage.clone();
    let essay = essay.to_string();
    with_retry("essay_feedback", || {
        let storage = storage.clone();
        let essay = essay.clone();
        async move { storage.upsert_essay(person_id, &essay, i64::from(graded)).await }
    })
    .await
    .map_err(internal)?;

    info!(person_id = person_id.0, graded, "essay feedback saved");
    Ok(graded)
}

pub async fn save_motivation_feedback(
    ctx: &ApiContext,
    identity: Option<&SessionIdentity>,
    text: &str,
) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "motivation answer must not be empty",
        ));
    }
    let person_id = resolve_person(ctx, identity).await?;

    let storage = ctx.storage.clone();
    let text = text.to_string();
    with_retry("motivation_feedback", || {
        let storage = storage.clone();
        let text = text.clone();
        async move { storage.upsert_motivation(person_id, &text).await }
    })
    .await
    .map_err(internal)?;

    info!(person_id = person_id.0, "motivation feedback saved");
    Ok(())
}

pub async fn scores_for_person(
    ctx: &ApiContext,
    identity: Option<&SessionIdentity>,
) -> Result<ScoreRecord, ApiError> {
    let person_id = resolve_person(ctx, identity).await?;
    let record = ctx
        .storage
        .get_score(person_id)
        .await
        .map_err(internal)?
        .unwrap_or_default();
    Ok(record)
}

/// Resolves both persisted aggregate scores and maps them to the final
/// marketer type. A missing score row classifies as the default type.
pub async fn final_result(
    ctx: &ApiContext,
    identity: Option<&SessionIdentity>,
) -> Result<MarketerType, ApiError> {
    let record = scores_for_person(ctx, identity).await?;
    Ok(classify(record.meeting_two_score, record.meeting_three_score))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
