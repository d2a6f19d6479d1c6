use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::AppendHeaders,
    routing::{get, post},
    Json, Router,
};
use flow::{EntryQuery, FlowController};
use grading::OpenAiGrader;
use server_api::ApiContext;
use shared::{
    domain::SessionIdentity,
    error::{ApiError, ErrorCode},
    protocol::{
        EntryResponse, FreeTextRequest, MeetingTwoScoreRequest, RegisterRequest, RegisterResponse,
        ResultResponse, ScoresResponse,
    },
};
use storage::Storage;
use tracing::info;

mod config;
mod cookies;

use config::{load_settings, prepare_database_url};
use cookies::{clear_session_cookies, identity_from_headers, set_session_cookies};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type SetCookies = AppendHeaders<[(axum::http::HeaderName, String); 2]>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await?;
    let api = ApiContext {
        storage,
        grader: Arc::new(OpenAiGrader::new(settings.grading_config())),
    };

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "onboarding server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/register", post(register))
        .route("/entry", get(entry))
        .route("/scores", get(get_scores))
        .route("/scores/meeting-two", post(save_meeting_two))
        .route("/scores/essay", post(save_essay))
        .route("/scores/motivation", post(save_motivation))
        .route("/result", get(result))
        .with_state(state)
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|error| error_response(ApiError::new(ErrorCode::Internal, error.to_string())))?;
    Ok("ok")
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(SetCookies, Json<RegisterResponse>), (StatusCode, Json<ApiError>)> {
    let person_id = server_api::register_person(&state.api, &req.name, &req.email)
        .await
        .map_err(error_response)?;

    let identity = SessionIdentity {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
    };
    Ok((
        set_cookie_headers(set_session_cookies(&identity)),
        Json(RegisterResponse { person_id }),
    ))
}

/// Resolves where a visitor lands: returning sessions skip to the chat
/// scene, deep links open the meeting cover, everyone else starts fresh.
async fn entry(
    headers: HeaderMap,
    Query(query): Query<EntryQuery>,
) -> Json<EntryResponse> {
    let controller = FlowController::resume(identity_from_headers(&headers), &query);
    let name = Some(controller.profile().name.clone()).filter(|n| !n.is_empty());
    Json(EntryResponse {
        scene: controller.scene().as_str().to_string(),
        name,
    })
}

async fn save_meeting_two(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MeetingTwoScoreRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let identity = identity_from_headers(&headers);
    server_api::save_meeting_two_score(&state.api, identity.as_ref(), req.score)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn save_essay(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<FreeTextRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let identity = identity_from_headers(&headers);
    let graded = server_api::save_essay_feedback(&state.api, identity.as_ref(), &req.text)
        .await
        .map_err(error_response)?;
    Ok(Json(serde_json::json!({ "meeting_three_score": graded })))
}

async fn save_motivation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<FreeTextRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let identity = identity_from_headers(&headers);
    server_api::save_motivation_feedback(&state.api, identity.as_ref(), &req.text)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_scores(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScoresResponse>, (StatusCode, Json<ApiError>)> {
    let identity = identity_from_headers(&headers);
    let record = server_api::scores_for_person(&state.api, identity.as_ref())
        .await
        .map_err(error_response)?;
    Ok(Json(ScoresResponse {
        meeting_two_score: record.meeting_two_score,
        meeting_three_score: record.meeting_three_score,
    }))
}

/// Terminal scene: classifies the persisted scores and drops the session
/// cookies so the next visit starts a fresh flow.
async fn result(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(SetCookies, Json<ResultResponse>), (StatusCode, Json<ApiError>)> {
    let identity = identity_from_headers(&headers);
    let marketer_type = server_api::final_result(&state.api, identity.as_ref())
        .await
        .map_err(error_response)?;

    Ok((
        set_cookie_headers(clear_session_cookies()),
        Json(ResultResponse {
            label: marketer_type.label().to_string(),
            asset_path: marketer_type.asset_path().to_string(),
        }),
    ))
}

fn set_cookie_headers(values: [String; 2]) -> SetCookies {
    let [name_cookie, email_cookie] = values;
    AppendHeaders([
        (axum::http::header::SET_COOKIE, name_cookie),
        (axum::http::header::SET_COOKIE, email_cookie),
    ])
}

fn error_response(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}
