use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 3;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

const GRADING_RUBRIC: &str = "\
You are an AI assistant designed to grade short essay answers based on their relevance and insight.

Grade the following essay on a scale of 1 to 3, where:
- 1: The answer is irrelevant or shows very little understanding.
- 2: The answer is somewhat relevant and shows some understanding, but lacks depth or clarity.
- 3: The answer is highly relevant, insightful, and demonstrates a strong understanding of the topic.

Your response MUST be a single number (1, 2, or 3) and nothing else. Do not include any additional text, explanations, or formatting.

Essay to grade:
";

#[derive(Debug, Clone)]
pub struct GradingConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
        }
    }
}

/// Converts a free-text reflection answer into a 1-3 score. Implementations
/// never fail: any problem downstream degrades to the lowest grade so a
/// broken grading backend cannot stall the flow.
#[async_trait]
pub trait EssayGrader: Send + Sync {
    async fn grade(&self, essay: &str) -> u8;
}

/// OpenAI-style chat-completions grader. Deterministic settings: temperature
/// zero and a single output token, since the rubric demands a bare digit.
pub struct OpenAiGrader {
    config: GradingConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiGrader {
    pub fn new(config: GradingConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn try_grade(&self, api_key: &str, essay: &str) -> Result<Option<String>, reqwest::Error> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: GRADING_RUBRIC,
                },
                ChatMessage {
                    role: "user",
                    content: essay,
                },
            ],
            temperature: 0.0,
            max_tokens: 1,
        };

        let response: ChatResponse = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

#[async_trait]
impl EssayGrader for OpenAiGrader {
    async fn grade(&self, essay: &str) -> u8 {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            error!("grading api key is not configured, defaulting to minimum grade");
            return MIN_GRADE;
        };

        match self.try_grade(api_key, essay).await {
            Ok(reply) => parse_grade(reply.as_deref().unwrap_or_default()),
            Err(error) => {
                error!(%error, "essay grading call failed, defaulting to minimum grade");
                MIN_GRADE
            }
        }
    }
}

/// Fixed-score grader used by tests and offline runs.
pub struct FixedGrader(pub u8);

#[async_trait]
impl EssayGrader for FixedGrader {
    async fn grade(&self, _essay: &str) -> u8 {
        self.0.clamp(MIN_GRADE, MAX_GRADE)
    }
}

fn parse_grade(reply: &str) -> u8 {
    match reply.trim().parse::<u8>() {
        Ok(score) if (MIN_GRADE..=MAX_GRADE).contains(&score) => score,
        _ => {
            warn!(reply, "grader returned an out-of-range score, defaulting to minimum");
            MIN_GRADE
        }
    }
}
