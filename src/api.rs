//! HTTP API for the interpretability service
//!
//! Provides REST endpoints over axum:
//!
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus-formatted metrics
//! - `GET /layer-head-info` - Model layer/head dimensions
//! - `POST /chat` - Chat completion via the hosted API
//! - `POST /saliency` - Token saliency scores (cached by exact text)
//! - `POST /attention-graph` - 3D attention graph scene
//!
//! The saliency and attention endpoints catch pipeline errors at the
//! boundary and answer HTTP 200 with an `{"error": ...}` envelope; the
//! chat endpoint maps failures onto HTTP error statuses instead.
//!
//! ## Example
//!
//! ```rust,ignore
//! use entender::api::{create_router, AppState};
//!
//! let state = AppState::demo()?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    attention::extract_attention,
    chat::{ChatClient, ChatParams},
    config::CHAT_API_KEY_VAR,
    error::{EntenderError, Result},
    graph::AttentionGraph,
    layers::{Model, ModelConfig},
    layout::{spring_layout, LAYOUT_SEED},
    metrics::MetricsCollector,
    saliency::{compute_saliency, SaliencyCache},
    scene::Scene,
    tokenizer::Tokenizer,
};

/// Application state shared across handlers
///
/// Model, tokenizer, and cache are constructed once at startup and
/// injected here; handlers never reach for process-wide globals.
#[derive(Clone)]
pub struct AppState {
    /// Local model used for attention extraction and saliency
    model: Arc<Model>,
    /// Tokenizer paired with the model
    tokenizer: Arc<Tokenizer>,
    /// Hosted chat client, absent when no credential is configured
    chat: Option<Arc<ChatClient>>,
    /// Saliency result cache
    cache: Arc<SaliencyCache>,
    /// Metrics collector
    metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Create application state from a model and tokenizer
    #[must_use]
    pub fn new(model: Model, tokenizer: Tokenizer) -> Self {
        Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            chat: None,
            cache: Arc::new(SaliencyCache::new()),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Attach a hosted chat client
    #[must_use]
    pub fn with_chat(mut self, client: ChatClient) -> Self {
        self.chat = Some(Arc::new(client));
        self
    }

    /// Replace the saliency cache (e.g. with a bounded one)
    #[must_use]
    pub fn with_cache(mut self, cache: SaliencyCache) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    /// Create a demo state with a small seeded model
    ///
    /// # Errors
    ///
    /// Returns error if model or tokenizer construction fails.
    pub fn demo() -> Result<Self> {
        let tokenizer = Tokenizer::demo()?;
        let config = ModelConfig {
            vocab_size: tokenizer.vocab_size(),
            hidden_dim: 32,
            num_heads: 4,
            num_layers: 2,
            intermediate_dim: 64,
            eps: 1e-5,
        };
        let model = Model::seeded(config, 42)?;
        Ok(Self::new(model, tokenizer))
    }

    /// Shared model handle
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Shared saliency cache handle
    #[must_use]
    pub fn cache(&self) -> &SaliencyCache {
        &self.cache
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error envelope shared by all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Free-text error message
    pub error: String,
}

/// Chat request
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message
    pub message: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling probability mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Top-k cutoff
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Presence penalty
    #[serde(default)]
    pub presence_penalty: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_top_k() -> u32 {
    50
}
fn default_max_tokens() -> u32 {
    200
}

/// Chat response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model reply
    pub response: String,
}

/// Saliency request
#[derive(Debug, Serialize, Deserialize)]
pub struct SaliencyRequest {
    /// Text to score
    pub text: String,
}

/// Attention graph request
#[derive(Debug, Serialize, Deserialize)]
pub struct AttentionGraphRequest {
    /// Text to visualize
    pub text: String,
    /// Optional context prefixed to the text
    #[serde(default)]
    pub context: String,
    /// Layer selection
    #[serde(default)]
    pub layer: usize,
    /// Head selection
    #[serde(default)]
    pub head: usize,
    /// Edge inclusion threshold (strict)
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_threshold() -> f32 {
    0.01
}

/// Layer/head metadata response, derived from the loaded model
#[derive(Debug, Serialize, Deserialize)]
pub struct LayerHeadInfoResponse {
    /// Number of transformer layers
    pub layers: usize,
    /// Number of attention heads per layer
    pub heads: usize,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/layer-head-info", get(layer_head_info_handler))
        .route("/chat", post(chat_handler))
        .route("/saliency", post(saliency_handler))
        .route("/attention-graph", post(attention_graph_handler))
        .with_state(state)
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Metrics handler - returns Prometheus-formatted metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus()
}

/// Layer/head metadata handler
///
/// Dimensions come from the loaded model's configuration, so they stay
/// correct when the model is swapped.
async fn layer_head_info_handler(State(state): State<AppState>) -> Json<LayerHeadInfoResponse> {
    let config = state.model.config();
    Json(LayerHeadInfoResponse {
        layers: config.num_layers,
        heads: config.num_heads,
    })
}

/// Chat handler - delegates to the hosted chat API
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(client) = state.chat.clone() else {
        state.metrics.record_failure();
        let err = EntenderError::MissingCredential {
            name: CHAT_API_KEY_VAR.to_string(),
        };
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        ));
    };

    let params = ChatParams {
        temperature: request.temperature,
        top_p: request.top_p,
        top_k: request.top_k,
        presence_penalty: request.presence_penalty,
        max_tokens: request.max_tokens,
    };

    let response = client
        .complete(&request.message, &params)
        .await
        .map_err(|e| {
            state.metrics.record_failure();
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    state.metrics.record_chat();
    Ok(Json(ChatResponse { response }))
}

/// Saliency handler - cached gradient saliency scores
///
/// Failures answer HTTP 200 with the `{"error": ...}` envelope.
async fn saliency_handler(
    State(state): State<AppState>,
    Json(request): Json<SaliencyRequest>,
) -> Response {
    let cache_hit = state.cache.get(&request.text).is_some();
    let result = state.cache.get_or_compute(&request.text, || {
        compute_saliency(&state.model, &state.tokenizer, &request.text)
    });

    match result {
        Ok(saliency) => {
            state.metrics.record_saliency(cache_hit);
            Json(&*saliency).into_response()
        }
        Err(e) => {
            state.metrics.record_failure();
            Json(ErrorResponse {
                error: e.to_string(),
            })
            .into_response()
        }
    }
}

/// Attention graph handler - runs the full visualization pipeline
///
/// Failures answer HTTP 200 with the `{"error": ...}` envelope.
async fn attention_graph_handler(
    State(state): State<AppState>,
    Json(request): Json<AttentionGraphRequest>,
) -> Response {
    match build_scene(&state, &request) {
        Ok(scene) => {
            state.metrics.record_attention(scene.edges.len());
            Json(scene).into_response()
        }
        Err(e) => {
            state.metrics.record_failure();
            Json(ErrorResponse {
                error: e.to_string(),
            })
            .into_response()
        }
    }
}

/// Extraction → graph → layout → scene, one request-scoped pass
fn build_scene(state: &AppState, request: &AttentionGraphRequest) -> Result<Scene> {
    let (stack, token_ids) =
        extract_attention(&state.model, &state.tokenizer, &request.text, &request.context)?;
    let matrix = stack.matrix(request.layer, request.head)?;
    let graph = AttentionGraph::from_matrix(matrix, request.threshold)?;
    let positions = spring_layout(&graph, LAYOUT_SEED);
    let labels = state.tokenizer.labels(&token_ids);
    Scene::build(&graph, &positions, &labels, request.layer, request.head)
}
