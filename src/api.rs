//! REST API Server for the financial coach
//!
//! Exposes users, transactions and the coaching pipeline via HTTP endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::advice;
use crate::audit::{AuditLog, CoachingRecord};
use crate::coach::{coach, CoachResponse, CoachingContext, InterventionAdvisor};
use crate::error::CoachError;
use crate::extraction::TransactionExtractor;
use crate::funds::suggest_funds;
use crate::models::{CoachingReport, NewUser, ReportingPeriod, Transaction, TransactionDraft, User};
use crate::pipeline::CoachingPipeline;
use crate::store::LedgerStore;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CoachRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessageRequest {
    pub user_id: Uuid,
    pub text: String,
}

/// Investment plan endpoint returns at most this many funds
const PLAN_FUND_LIMIT: usize = 5;

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(status: StatusCode, data: T) -> ApiResult {
    (status, Json(ApiResponse::success(data)))
}

/// Upstream model errors are logged in full but answered generically.
fn failure(err: CoachError) -> ApiResult {
    let (status, message) = match &err {
        CoachError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        CoachError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CoachError::Extraction(_) | CoachError::HttpError(_) => (
            StatusCode::BAD_GATEWAY,
            "Could not read the message: language model unavailable".to_string(),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };

    if status.is_server_error() {
        warn!(error = %err, status = %status, "Request failed");
    }

    (status, Json(ApiResponse::error(message)))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn LedgerStore>,
    pub pipeline: Arc<CoachingPipeline>,
    pub extractor: Arc<dyn TransactionExtractor>,
    pub advisor: Arc<dyn InterventionAdvisor>,
    pub audit_log: Arc<AuditLog>,
}

struct Analysis {
    user: User,
    history: Vec<Transaction>,
    coaching: CoachingReport,
    audit_id: Uuid,
}

/// Load the user's history once, run the pipeline and record the run.
async fn analyze_user(state: &ApiState, user_id: Uuid) -> crate::Result<Analysis> {
    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| CoachError::NotFound(format!("User with id {} not found", user_id)))?;

    let history = state
        .store
        .get_transactions(user_id, ReportingPeriod::AllTime)
        .await?;

    if history.is_empty() {
        return Err(CoachError::NotFound(
            "No transactions found for this user".to_string(),
        ));
    }

    let coaching = state.pipeline.run(&user, &history)?;

    let audit_id = state
        .audit_log
        .record(CoachingRecord::new(user.id, &history, coaching.clone()))
        .await?;

    Ok(Analysis {
        user,
        history,
        coaching,
        audit_id,
    })
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Users
/// =============================

async fn list_users(State(state): State<ApiState>) -> ApiResult {
    match state.store.list_users().await {
        Ok(users) => ok(StatusCode::OK, users),
        Err(e) => failure(e),
    }
}

async fn create_user(State(state): State<ApiState>, Json(req): Json<NewUser>) -> ApiResult {
    match state.store.create_user(req).await {
        Ok(user) => {
            info!(user_id = %user.id, risk = %user.risk_profile, "User created");
            ok(StatusCode::CREATED, user)
        }
        Err(e) => failure(e),
    }
}

async fn get_user(State(state): State<ApiState>, Path(user_id): Path<Uuid>) -> ApiResult {
    match state.store.get_user(user_id).await {
        Ok(Some(user)) => ok(StatusCode::OK, user),
        Ok(None) => failure(CoachError::NotFound(format!("User with id {} not found", user_id))),
        Err(e) => failure(e),
    }
}

/// =============================
/// Transactions
/// =============================

async fn record_transaction(
    State(state): State<ApiState>,
    Json(draft): Json<TransactionDraft>,
) -> ApiResult {
    match state.store.record_transaction(draft).await {
        Ok(tx) => ok(StatusCode::CREATED, tx),
        Err(e) => failure(e),
    }
}

/// =============================
/// Coaching Endpoints
/// =============================

async fn coach_advise(State(state): State<ApiState>, Json(req): Json<CoachRequest>) -> ApiResult {
    info!(user_id = %req.user_id, "Received coaching request");

    match analyze_user(&state, req.user_id).await {
        Ok(analysis) => {
            let latest = analysis.history.first();
            let message = advice::message_for(latest, &analysis.coaching);

            ok(
                StatusCode::OK,
                serde_json::json!({
                    "transaction": latest,
                    "totals": analysis.coaching.totals,
                    "report": analysis.coaching.report,
                    "plan": analysis.coaching.plan,
                    "proposal": analysis.coaching.proposal,
                    "message": message,
                    "audit_id": analysis.audit_id,
                }),
            )
        }
        Err(e) => failure(e),
    }
}

async fn investment_plan(
    State(state): State<ApiState>,
    Json(req): Json<CoachRequest>,
) -> ApiResult {
    match analyze_user(&state, req.user_id).await {
        Ok(analysis) => {
            let user = &analysis.user;
            let coaching = &analysis.coaching;
            let funds: Vec<_> = suggest_funds(user.risk_profile, coaching.proposal.investable_amount)
                .into_iter()
                .take(PLAN_FUND_LIMIT)
                .collect();

            ok(
                StatusCode::OK,
                serde_json::json!({
                    "user": {
                        "id": user.id,
                        "name": user.name,
                        "risk_profile": user.risk_profile,
                        "goals": user.goals,
                    },
                    "financial_summary": {
                        "monthly_income": coaching.totals.monthly_income,
                        "monthly_expenses": coaching.totals.monthly_expenses,
                        "saving_potential": coaching.report.saving_potential,
                        "burn_rate": coaching.report.burn_rate,
                    },
                    "risk_profile": user.risk_profile,
                    "report": analysis.coaching.report,
                    "plan": analysis.coaching.plan,
                    "proposal": analysis.coaching.proposal,
                    "fund_suggestions": funds,
                    "audit_id": analysis.audit_id,
                }),
            )
        }
        Err(e) => failure(e),
    }
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_message(
    State(state): State<ApiState>,
    Json(req): Json<ChatMessageRequest>,
) -> ApiResult {
    match handle_chat(&state, req).await {
        Ok(data) => ok(StatusCode::OK, data),
        Err(e) => failure(e),
    }
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub recorded: Vec<Transaction>,
    /// Regret message when the coach intervenes, otherwise null
    pub message: Option<String>,
    #[serde(flatten)]
    pub coaching: CoachResponse,
}

/// Extract → record → coach. A message with no amounts records nothing but
/// is still coached.
async fn handle_chat(state: &ApiState, req: ChatMessageRequest) -> crate::Result<ChatReply> {
    let user = state
        .store
        .get_user(req.user_id)
        .await?
        .ok_or_else(|| CoachError::NotFound(format!("User with id {} not found", req.user_id)))?;

    let extracted = state.extractor.extract(&req.text).await?;
    let today = Utc::now().date_naive();
    let drafts = extracted.clone().into_drafts(user.id, today);

    let mut recorded = Vec::with_capacity(drafts.len());
    for draft in drafts {
        recorded.push(state.store.record_transaction(draft).await?);
    }

    let history = state
        .store
        .get_transactions(user.id, ReportingPeriod::AllTime)
        .await?;

    let context = CoachingContext::new(user, extracted, &req.text, &history, today);
    let coaching = coach(state.advisor.as_ref(), &context).await;

    let message = if coaching.should_intervene {
        coaching.regret_message.clone()
    } else {
        None
    };

    Ok(ChatReply {
        recorded,
        message,
        coaching,
    })
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id", get(get_user))
        .route("/transactions", post(record_transaction))
        .route("/coach/advise", post(coach_advise))
        .route("/coach/investment-plan", post(investment_plan))
        .route("/chat/message", post(chat_message))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
