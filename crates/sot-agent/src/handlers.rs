//! HTTP Handlers

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sot_core::{provider::ModelInfo, InstructionOutcome, InstructionSet, WorldModel};
use sot_sensors::SensorReadings;
use sot_visual::{Rendering, Thought};

use crate::agent::CycleReport;
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ReasonRequest {
    /// Omit to work off the event queue
    #[serde(default)]
    pub query: Option<String>,

    /// Read sensors before reasoning
    #[serde(default)]
    pub read_sensors: bool,
}

#[derive(Debug, Deserialize)]
pub struct InstructionSpec {
    pub text: String,
    #[serde(default)]
    pub priority: i32,
    /// Positions of other entries in the same request
    #[serde(default)]
    pub dependencies: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct InstructionsRequest {
    pub instructions: Vec<InstructionSpec>,
}

#[derive(Debug, Serialize)]
pub struct InstructionsResponse {
    pub outcomes: Vec<InstructionOutcome>,
    /// Instructions left pending because their dependencies never completed
    pub pending: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SketchRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thoughts: Option<Vec<Thought>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IngestRequest {
    /// Omit to read the registered sensors
    #[serde(default)]
    pub data: Option<SensorReadings>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub events: Vec<String>,
    /// Events queued and not yet reasoned about
    pub pending_events: usize,
    pub world: WorldModel,
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        .route("/api/reason", post(reason))
        .route("/api/instructions", post(run_instructions))
        .route("/api/sketch", post(render_sketch))
        .route("/api/ingest", post(ingest))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider_connected,
    })
}

/// Models the configured provider offers
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModelInfo>>, ApiError> {
    state.provider.list_models().await.map(Json).map_err(|e| {
        tracing::warn!("Model listing failed: {}", e);
        api_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", e.user_message())
    })
}

/// Reason about a query (or the next queued event)
pub async fn reason(
    State(state): State<AppState>,
    Json(payload): Json<ReasonRequest>,
) -> Json<CycleReport> {
    let mut agent = state.agent.lock().await;
    let query = payload.query.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let report = if payload.read_sensors {
        agent.run_once(query).await
    } else {
        CycleReport {
            response: agent.process(query).await,
            events_detected: Vec::new(),
        }
    };
    Json(report)
}

/// Run a batch of prioritized, dependency-linked instructions
pub async fn run_instructions(
    State(state): State<AppState>,
    Json(payload): Json<InstructionsRequest>,
) -> Result<Json<InstructionsResponse>, ApiError> {
    if payload.instructions.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_INSTRUCTIONS",
            "At least one instruction is required",
        ));
    }

    let mut set = InstructionSet::new();
    for spec in payload.instructions {
        set.add(spec.text, spec.priority, spec.dependencies);
    }

    let agent = state.agent.lock().await;
    let outcomes = agent.run_instructions(&mut set).await;
    let pending = set.iter().filter(|i| !i.completed).count();

    Ok(Json(InstructionsResponse { outcomes, pending }))
}

/// Render a sketch or a thought tree
pub async fn render_sketch(
    State(state): State<AppState>,
    Json(payload): Json<SketchRequest>,
) -> Result<Json<Rendering>, ApiError> {
    let agent = state.agent.lock().await;
    match (payload.thoughts, payload.text) {
        (Some(thoughts), _) => Ok(Json(agent.render_thought_tree(&thoughts))),
        (None, Some(text)) => Ok(Json(agent.render_sketch(&text))),
        (None, None) => Err(api_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_SKETCH",
            "Provide `text` or `thoughts`",
        )),
    }
}

/// Feed sensor data (or a fresh sensor read) into the world model
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<IngestRequest>,
) -> Json<IngestResponse> {
    let mut agent = state.agent.lock().await;
    let events = agent.ingest_data(payload.data).await;
    Json(IngestResponse {
        events,
        pending_events: agent.pending_events().count(),
        world: agent.world().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use sot_core::{mock::ScriptedProvider, GenerationOptions, LlmProvider, TextGenerator};
    use sot_sensors::{SensorDataManager, SimulatedDriver};
    use sot_visual::SketchRenderer;
    use tower::ServiceExt;

    use crate::agent::SotAgent;

    fn app(provider: ScriptedProvider) -> Router {
        let provider: Arc<dyn LlmProvider> = Arc::new(provider);
        let generator = TextGenerator::new(provider.clone(), GenerationOptions::default());
        let sensors = SensorDataManager::new(Arc::new(SimulatedDriver::seeded(9)));
        let agent = SotAgent::new(generator, sensors, SketchRenderer::default());
        router(AppState::new(agent, provider))
    }

    async fn call(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(ScriptedProvider::new(["x"])).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["provider_connected"], true);
    }

    #[tokio::test]
    async fn test_reason_query() {
        let reply = "<thinking>\nx = 2\ny = x + 1\n</thinking>\n<answer>\n3\n</answer>";
        let (status, body) = call(
            app(ScriptedProvider::new([reply])),
            "POST",
            "/api/reason",
            json!({"query": "calculate y"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["reasoning"]["paradigm"], "chunked_symbolism");
        assert_eq!(body["output"]["text"], "3");
        assert_eq!(body["output"]["visualization"]["format"], "latex");
    }

    #[tokio::test]
    async fn test_reason_idle() {
        let (_, body) = call(app(ScriptedProvider::new(["x"])), "POST", "/api/reason", json!({})).await;
        assert_eq!(body["status"], "idle");
    }

    #[tokio::test]
    async fn test_instructions_endpoint() {
        let (status, body) = call(
            app(ScriptedProvider::from_fn(|_| Ok(r#"{"done": true}"#.into()))),
            "POST",
            "/api/instructions",
            json!({"instructions": [
                {"text": "a", "priority": 1},
                {"text": "b", "priority": 2, "dependencies": [0]},
                {"text": "c", "priority": 3, "dependencies": [3]},
                {"text": "d", "dependencies": [2]}
            ]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let outcomes = body["outcomes"].as_array().unwrap();
        let order: Vec<&str> = outcomes
            .iter()
            .map(|o| o["instruction"].as_str().unwrap())
            .collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(body["pending"], 2);
    }

    #[tokio::test]
    async fn test_empty_instructions_rejected() {
        let (status, body) = call(
            app(ScriptedProvider::new(["x"])),
            "POST",
            "/api/instructions",
            json!({"instructions": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EMPTY_INSTRUCTIONS");
    }

    #[tokio::test]
    async fn test_sketch_endpoint() {
        let (status, body) = call(
            app(ScriptedProvider::new(["x"])),
            "POST",
            "/api/sketch",
            json!({"text": "A -> B\nC -> D"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // one arrow per line: two in total makes a chain
        assert_eq!(body["type"], "conceptual_chain");
        assert_eq!(body["format"], "image/png;base64");
        assert_eq!(body["edges"].as_array().unwrap().len(), 2);

        let (status, _) =
            call(app(ScriptedProvider::new(["x"])), "POST", "/api/sketch", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ingest_endpoint() {
        let (status, body) = call(
            app(ScriptedProvider::new(["x"])),
            "POST",
            "/api/ingest",
            json!({"data": {"temperature": 40.0, "humidity": 50.0}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"].as_array().unwrap().len(), 1);
        assert_eq!(body["pending_events"], 1);
        assert_eq!(body["world"]["heat_index"], 42.5);
    }
}
