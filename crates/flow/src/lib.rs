//! Scene-sequencing state machine for the onboarding flow.
//!
//! The controller is pure: it owns the current scene, the registered
//! profile and the meeting-two accumulator, and maps user events to the
//! next scene plus a list of [`Effect`]s the caller is expected to carry
//! out (persistence, grading, cookie clearing). It performs no I/O itself.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use shared::domain::SessionIdentity;

pub mod answers;
pub mod script;

use answers::{
    meeting_two_key, normalize_calculator_display, AnswerKind, M1Q1_CORRECT, M1Q2_CORRECT,
    M1Q3_CORRECT_PAIR,
};

/// How long the wrong-answer popup stays up before the scene re-arms.
pub const WRONG_ANSWER_POPUP: Duration = Duration::from_millis(2000);

/// One full-screen step of the linear flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    Welcome,
    Registration,
    Chat,
    MeetingCover,
    M1Q1,
    M1Q2,
    M1Q3,
    MeetingTransition,
    Meeting2Cover,
    M2Q1,
    M2Q2,
    M2Q3,
    M2Q4,
    M2Q5,
    M2Q6,
    M2Q7,
    M2ToM3Transition,
    Meeting3Cover,
    M3Q1,
    M3Q2,
    M3Q3,
    Closing,
}

impl Scene {
    /// The strict predecessor reachable via "back", where one exists.
    /// Transition popups and the terminal scene have none.
    pub fn back(self) -> Option<Scene> {
        match self {
            Scene::Registration => Some(Scene::Welcome),
            Scene::Chat => Some(Scene::Registration),
            Scene::MeetingCover => Some(Scene::Chat),
            Scene::M1Q1 => Some(Scene::MeetingCover),
            Scene::M1Q2 => Some(Scene::M1Q1),
            Scene::M1Q3 => Some(Scene::M1Q2),
            Scene::Meeting2Cover => Some(Scene::M1Q3),
            Scene::M2Q1 => Some(Scene::Meeting2Cover),
            Scene::M2Q2 => Some(Scene::M2Q1),
            Scene::M2Q3 => Some(Scene::M2Q2),
            Scene::M2Q4 => Some(Scene::M2Q3),
            Scene::M2Q5 => Some(Scene::M2Q4),
            Scene::M2Q6 => Some(Scene::M2Q5),
            Scene::M2Q7 => Some(Scene::M2Q6),
            Scene::Meeting3Cover => Some(Scene::M2Q7),
            Scene::M3Q1 => Some(Scene::Meeting3Cover),
            Scene::M3Q2 => Some(Scene::M3Q1),
            Scene::M3Q3 => Some(Scene::M3Q2),
            Scene::Welcome
            | Scene::MeetingTransition
            | Scene::M2ToM3Transition
            | Scene::Closing => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scene::Welcome => "welcome",
            Scene::Registration => "registration",
            Scene::Chat => "chat",
            Scene::MeetingCover => "meeting-cover",
            Scene::M1Q1 => "m1q1",
            Scene::M1Q2 => "m1q2",
            Scene::M1Q3 => "m1q3",
            Scene::MeetingTransition => "meeting-transition",
            Scene::Meeting2Cover => "meeting2-cover",
            Scene::M2Q1 => "m2q1",
            Scene::M2Q2 => "m2q2",
            Scene::M2Q3 => "m2q3",
            Scene::M2Q4 => "m2q4",
            Scene::M2Q5 => "m2q5",
            Scene::M2Q6 => "m2q6",
            Scene::M2Q7 => "m2q7",
            Scene::M2ToM3Transition => "m2tom3-transition",
            Scene::Meeting3Cover => "meeting3-cover",
            Scene::M3Q1 => "m3q1",
            Scene::M3Q2 => "m3q2",
            Scene::M3Q3 => "m3q3",
            Scene::Closing => "closing",
        }
    }
}

/// User-triggered transition events. Payload-carrying variants match the
/// scenes that expect them; anything else is an [`FlowError::UnexpectedEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent<'a> {
    /// Plain advance for covers, popups and the chat scene.
    Next,
    /// Return to the strict predecessor scene.
    Back,
    /// Registration form submit.
    SubmitProfile { name: &'a str, email: &'a str },
    /// Single-choice answer for the gated meeting-one quizzes.
    SubmitChoice(&'a str),
    /// The two drop-slot option ids for the drag-and-drop quiz.
    SubmitPair(&'a str, &'a str),
    /// A scored meeting-two answer: an option id or calculator display.
    SubmitScored(&'a str),
    /// Free-text reflection answer.
    SubmitText(&'a str),
}

/// Side effects the caller must perform after a transition. Ordering
/// matters: effects are listed in the order they should be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upsert the accumulated meeting-two total for the current person.
    PersistMeetingTwoScore(i64),
    /// Grade the essay (1-3) and upsert text plus grade in one write.
    GradeAndPersistEssay(String),
    /// Upsert the motivation answer text.
    PersistMotivation(String),
    /// Fetch both persisted scores and compute the marketer type.
    ResolveResult,
    /// Drop the session-identity cookies; the flow is complete.
    ClearSession,
}

/// Outcome of a successful event dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The flow advanced (or went back) to `scene`.
    Moved { scene: Scene, effects: Vec<Effect> },
    /// A gated quiz rejected the answer: show the popup for
    /// [`WRONG_ANSWER_POPUP`], reset the selection, stay on the scene.
    WrongAnswer { popup: Duration },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("scene {0:?} does not accept this event")]
    UnexpectedEvent(Scene),
    #[error("scene {0:?} has no back transition")]
    NoBack(Scene),
    #[error("answer must not be empty")]
    EmptyAnswer,
    #[error("the flow is already complete")]
    FlowComplete,
}

/// Deep-link query parameters carried on re-entry links.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryQuery {
    pub scene: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct FlowController {
    scene: Scene,
    profile: Profile,
    meeting_two_score: i64,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            scene: Scene::Welcome,
            profile: Profile::default(),
            meeting_two_score: 0,
        }
    }

    /// Entry resolution: a returning session (both identity cookies present)
    /// skips straight to the chat scene; a `scene=meeting-cover` deep link
    /// lands on the meeting cover with the display name from the query;
    /// everything else starts at the welcome scene.
    pub fn resume(cookie: Option<SessionIdentity>, query: &EntryQuery) -> Self {
        if let Some(identity) = cookie {
            return Self {
                scene: Scene::Chat,
                profile: Profile {
                    name: identity.name,
                    email: identity.email,
                },
                meeting_two_score: 0,
            };
        }
        if query.scene.as_deref() == Some("meeting-cover") {
            return Self {
                scene: Scene::MeetingCover,
                profile: Profile {
                    name: query.name.clone().unwrap_or_default(),
                    email: String::new(),
                },
                meeting_two_score: 0,
            };
        }
        Self::new()
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn meeting_two_score(&self) -> i64 {
        self.meeting_two_score
    }

    pub fn transition(&mut self, event: FlowEvent<'_>) -> Result<Step, FlowError> {
        if let FlowEvent::Back = event {
            let Some(previous) = self.scene.back() else {
                return Err(FlowError::NoBack(self.scene));
            };
            return Ok(self.moved(previous));
        }

        match (self.scene, event) {
            (Scene::Welcome, FlowEvent::Next) => Ok(self.moved(Scene::Registration)),
            (Scene::Registration, FlowEvent::SubmitProfile { name, email }) => {
                self.profile = Profile {
                    name: name.to_string(),
                    email: email.to_string(),
                };
                Ok(self.moved(Scene::Chat))
            }
            (Scene::Chat, FlowEvent::Next) => Ok(self.moved(Scene::MeetingCover)),
            (Scene::MeetingCover, FlowEvent::Next) => Ok(self.moved(Scene::M1Q1)),

            (Scene::M1Q1, FlowEvent::SubmitChoice(answer)) => {
                Ok(self.gate(answer == M1Q1_CORRECT, Scene::M1Q2))
            }
            (Scene::M1Q2, FlowEvent::SubmitChoice(answer)) => {
                Ok(self.gate(answer == M1Q2_CORRECT, Scene::M1Q3))
            }
            (Scene::M1Q3, FlowEvent::SubmitPair(first, second)) => {
                let matched = pair_matches(first, second, M1Q3_CORRECT_PAIR);
                Ok(self.gate(matched, Scene::MeetingTransition))
            }
            (Scene::MeetingTransition, FlowEvent::Next) => Ok(self.moved(Scene::Meeting2Cover)),
            (Scene::Meeting2Cover, FlowEvent::Next) => Ok(self.moved(Scene::M2Q1)),

            (
                scene @ (Scene::M2Q1
                | Scene::M2Q2
                | Scene::M2Q3
                | Scene::M2Q4
                | Scene::M2Q5
                | Scene::M2Q6
                | Scene::M2Q7),
                FlowEvent::SubmitScored(answer),
            ) => {
                self.meeting_two_score += score_answer(scene, answer);
                let next = match scene {
                    Scene::M2Q1 => Scene::M2Q2,
                    Scene::M2Q2 => Scene::M2Q3,
                    Scene::M2Q3 => Scene::M2Q4,
                    Scene::M2Q4 => Scene::M2Q5,
                    Scene::M2Q5 => Scene::M2Q6,
                    Scene::M2Q6 => Scene::M2Q7,
                    _ => Scene::M2ToM3Transition,
                };
                Ok(self.moved(next))
            }
            (Scene::M2ToM3Transition, FlowEvent::Next) => {
                let total = self.meeting_two_score;
                Ok(self.moved_with(
                    Scene::Meeting3Cover,
                    vec![Effect::PersistMeetingTwoScore(total)],
                ))
            }
            (Scene::Meeting3Cover, FlowEvent::Next) => Ok(self.moved(Scene::M3Q1)),
            (Scene::M3Q1, FlowEvent::Next) => Ok(self.moved(Scene::M3Q2)),

            (Scene::M3Q2, FlowEvent::SubmitText(text)) => {
                let text = require_text(text)?;
                Ok(self.moved_with(Scene::M3Q3, vec![Effect::GradeAndPersistEssay(text)]))
            }
            (Scene::M3Q3, FlowEvent::SubmitText(text)) => {
                let text = require_text(text)?;
                Ok(self.moved_with(Scene::Closing, vec![Effect::PersistMotivation(text)]))
            }

            (Scene::Closing, _) => Err(FlowError::FlowComplete),
            (scene, _) => Err(FlowError::UnexpectedEvent(scene)),
        }
    }

    fn gate(&mut self, correct: bool, next: Scene) -> Step {
        if correct {
            self.moved(next)
        } else {
            Step::WrongAnswer {
                popup: WRONG_ANSWER_POPUP,
            }
        }
    }

    fn moved(&mut self, next: Scene) -> Step {
        self.moved_with(next, Vec::new())
    }

    fn moved_with(&mut self, next: Scene, mut effects: Vec<Effect>) -> Step {
        self.scene = next;
        if next == Scene::Closing {
            effects.push(Effect::ResolveResult);
            effects.push(Effect::ClearSession);
        }
        Step::Moved {
            scene: next,
            effects,
        }
    }
}

fn require_text(text: &str) -> Result<String, FlowError> {
    if text.trim().is_empty() {
        return Err(FlowError::EmptyAnswer);
    }
    Ok(text.to_string())
}

fn pair_matches(first: &str, second: &str, expected: [&str; 2]) -> bool {
    (first == expected[0] && second == expected[1])
        || (first == expected[1] && second == expected[0])
}

fn score_answer(scene: Scene, answer: &str) -> i64 {
    let Some((key, kind)) = meeting_two_key(scene) else {
        return 0;
    };
    let correct = match kind {
        AnswerKind::Choice => answer == key,
        AnswerKind::Calculator => normalize_calculator_display(answer) == key,
    };
    i64::from(correct)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
