use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(PersonId);
id_newtype!(ScoreId);

/// Identity record created once at registration; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub person_id: PersonId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The single mutable aggregation row for a person. All fields start out
/// unset and are filled in by upserts as the participant moves through the
/// meetings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub meeting_two_score: Option<i64>,
    pub meeting_three_score: Option<i64>,
    pub essay_answer: Option<String>,
    pub motivation_answer: Option<String>,
}

/// The participant's registered name and email, as carried by the session
/// cookies. Not an auth token; only a weak re-identification key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketerType {
    DataAware,
    Creative,
    AllAround,
    Curious,
}

impl MarketerType {
    pub fn label(self) -> &'static str {
        match self {
            MarketerType::DataAware => "Data-Aware Marketer",
            MarketerType::Creative => "Creative Marketer",
            MarketerType::AllAround => "All-Around Marketer",
            MarketerType::Curious => "Curious Marketer",
        }
    }

    pub fn asset_path(self) -> &'static str {
        match self {
            MarketerType::DataAware => "/marketer-type/data-aware.svg",
            MarketerType::Creative => "/marketer-type/creative.svg",
            MarketerType::AllAround => "/marketer-type/all-around.svg",
            MarketerType::Curious => "/marketer-type/curious.svg",
        }
    }
}
