use serde::{Deserialize, Serialize};

use crate::domain::PersonId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub person_id: PersonId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingTwoScoreRequest {
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeTextRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoresResponse {
    pub meeting_two_score: Option<i64>,
    pub meeting_three_score: Option<i64>,
}

/// Final classification shown on the closing scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse {
    pub label: String,
    pub asset_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryResponse {
    pub scene: String,
    pub name: Option<String>,
}
