//! HTTP transport for the game registry.
//!
//! Every route lives under `/api`. Registry calls run on the blocking pool
//! because a store call may touch the disk. Owner-only routes require the
//! `token` query parameter to match the secret issued at join time.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::games::energy_war::{Board, GameError, GameErrorKind, GameView, ProposedPlant, StrikeOutcome};
use crate::registry::GameRegistry;

/// Grid size used when the create request names none.
pub const DEFAULT_SIZE: usize = 10;
/// Required capacity used when the create request names none.
pub const DEFAULT_CAPACITY: u32 = 1000;

/// Builds the router with all game routes mounted under `/api`.
#[instrument(skip(registry))]
pub fn router(registry: GameRegistry) -> Router {
    let api = Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/status", get(game_status))
        .route("/games/{id}/join", post(join_game))
        .route("/games/{id}/players/{name}/board", post(set_board).get(get_board))
        .route("/games/{id}/players/{name}/board/map", get(get_board_map))
        .route("/games/{id}/players/{name}/ready", post(set_ready))
        .route("/games/{id}/players/{name}/strike", post(strike))
        .route("/games/{id}/opponent/{name}/board", get(get_opponent_board))
        .route("/games/{id}/opponent/{name}/board/map", get(get_opponent_board_map));

    Router::new().nest("/api", api).with_state(registry)
}

/// Error body returned by every failing route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"ERROR"`.
    pub status: String,
    /// Machine-readable code such as `GAME_FULL`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

/// A failed request: HTTP status plus the error body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn missing_token() -> Self {
        Self::new(StatusCode::FORBIDDEN, "MISSING_TOKEN", "a player token is required")
    }

    fn invalid_token() -> Self {
        Self::new(StatusCode::FORBIDDEN, "INVALID_TOKEN", "the player token does not match")
    }

    fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_PARAMETERS", message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let status = match err.kind() {
            GameErrorKind::NotFound(_) | GameErrorKind::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            GameErrorKind::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.code(), err.kind().to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, code = self.code, message = %self.message, "Request failed");
        } else {
            warn!(status = %self.status, code = self.code, message = %self.message, "Request rejected");
        }
        let body = ErrorResponse {
            status: "ERROR".to_string(),
            error: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Runs a registry call on the blocking pool.
async fn blocking<T, F>(registry: &GameRegistry, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&GameRegistry) -> Result<T, GameError> + Send + 'static,
    T: Send + 'static,
{
    let registry = registry.clone();
    tokio::task::spawn_blocking(move || call(&registry))
        .await
        .map_err(|e| ApiError::internal(format!("registry task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Checks `token` against the secret the player received at join time.
async fn authorize(
    registry: &GameRegistry,
    id: &str,
    name: &str,
    token: Option<String>,
) -> Result<(), ApiError> {
    let token = token.filter(|t| !t.is_empty()).ok_or_else(ApiError::missing_token)?;
    let (id, name) = (id.to_string(), name.to_string());

    match blocking(registry, move |r| r.secret(&id, &name)).await {
        Ok(secret) if secret == token => Ok(()),
        Ok(_) => Err(ApiError::invalid_token()),
        Err(err) if err.code == "GAME_NOT_FOUND" || err.status.is_server_error() => Err(err),
        Err(_) => Err(ApiError::invalid_token()),
    }
}

/// Query for creating a game.
#[derive(Debug, Default, Deserialize)]
pub struct CreateParams {
    size: Option<usize>,
    capacity: Option<u32>,
    public: Option<bool>,
}

/// Query for joining a game.
#[derive(Debug, Default, Deserialize)]
pub struct JoinParams {
    player: Option<String>,
}

/// Query carrying the player token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    token: Option<String>,
}

/// Query for a strike: row letter `y` and 1-based column `x`.
#[derive(Debug, Default, Deserialize)]
pub struct StrikeParams {
    token: Option<String>,
    target: Option<String>,
    y: Option<String>,
    x: Option<String>,
}

/// Body of a board placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardRequest {
    /// Plants to place.
    pub plants: Vec<ProposedPlant>,
}

/// Response to a successful join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Secret for owner-only routes.
    pub token: String,
}

/// Response to a ready call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Always `"OK"`.
    pub result: String,
}

/// Response to a strike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeResponse {
    /// Always `"OK"`.
    pub status: String,
    /// `HIT` or `MISS`.
    pub result: StrikeOutcome,
}

#[instrument(skip(registry, params))]
async fn create_game(
    State(registry): State<GameRegistry>,
    params: Result<Query<CreateParams>, QueryRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::invalid_parameters(e.body_text()))?;
    let size = params.size.unwrap_or(DEFAULT_SIZE);
    let capacity = params.capacity.unwrap_or(DEFAULT_CAPACITY);
    let public = params.public.unwrap_or(false);

    let game = blocking(&registry, move |r| r.create(size, capacity, public)).await?;
    info!(game_id = %game.id(), size, capacity, public, "Game created over HTTP");
    Ok(Json(game.public_view()))
}

#[instrument(skip(registry))]
async fn list_games(State(registry): State<GameRegistry>) -> Result<Json<Vec<GameView>>, ApiError> {
    let games = blocking(&registry, |r| r.list_public()).await?;
    Ok(Json(games))
}

#[instrument(skip(registry))]
async fn get_game(
    State(registry): State<GameRegistry>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    let game = blocking(&registry, move |r| r.get(&id)).await?;
    Ok(Json(game.public_view()))
}

#[instrument(skip(registry))]
async fn game_status(
    State(registry): State<GameRegistry>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let game = blocking(&registry, move |r| r.get(&id)).await?;
    Ok(game.to_string())
}

#[instrument(skip(registry, params))]
async fn join_game(
    State(registry): State<GameRegistry>,
    Path(id): Path<String>,
    Query(params): Query<JoinParams>,
) -> Result<Json<JoinResponse>, ApiError> {
    let player = params
        .player
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::invalid_parameters("player is required"))?;

    let token = blocking(&registry, move |r| r.join(&id, &player)).await?;
    debug!("Player token issued");
    Ok(Json(JoinResponse { token }))
}

#[instrument(skip(registry, params, body))]
async fn set_board(
    State(registry): State<GameRegistry>,
    Path((id, name)): Path<(String, String)>,
    Query(params): Query<TokenParams>,
    body: Result<Json<BoardRequest>, JsonRejection>,
) -> Result<Json<Board>, ApiError> {
    authorize(&registry, &id, &name, params.token).await?;
    let Json(request) = body.map_err(|e| ApiError::invalid_parameters(e.body_text()))?;

    let board = blocking(&registry, move |r| r.set_board(&id, &name, &request.plants)).await?;
    Ok(Json(board))
}

#[instrument(skip(registry, params))]
async fn get_board(
    State(registry): State<GameRegistry>,
    Path((id, name)): Path<(String, String)>,
    Query(params): Query<TokenParams>,
) -> Result<Json<Board>, ApiError> {
    authorize(&registry, &id, &name, params.token).await?;
    let board = blocking(&registry, move |r| r.board(&id, &name)).await?;
    Ok(Json(board))
}

#[instrument(skip(registry, params))]
async fn get_board_map(
    State(registry): State<GameRegistry>,
    Path((id, name)): Path<(String, String)>,
    Query(params): Query<TokenParams>,
) -> Result<String, ApiError> {
    authorize(&registry, &id, &name, params.token).await?;
    blocking(&registry, move |r| r.render_board(&id, &name, false)).await
}

#[instrument(skip(registry, params))]
async fn set_ready(
    State(registry): State<GameRegistry>,
    Path((id, name)): Path<(String, String)>,
    Query(params): Query<TokenParams>,
) -> Result<Json<ReadyResponse>, ApiError> {
    authorize(&registry, &id, &name, params.token).await?;
    let started = blocking(&registry, move |r| r.set_ready(&id, &name)).await?;
    debug!(started, "Player ready");
    Ok(Json(ReadyResponse {
        result: "OK".to_string(),
    }))
}

#[instrument(skip(registry, params))]
async fn strike(
    State(registry): State<GameRegistry>,
    Path((id, name)): Path<(String, String)>,
    Query(params): Query<StrikeParams>,
) -> Result<Json<StrikeResponse>, ApiError> {
    authorize(&registry, &id, &name, params.token).await?;

    let (Some(target), Some(y), Some(x)) = (params.target, params.y, params.x) else {
        return Err(ApiError::invalid_parameters("target, y and x are required"));
    };
    if target.is_empty() || y.is_empty() || x.is_empty() {
        return Err(ApiError::invalid_parameters("target, y and x are required"));
    }
    if x.parse::<u32>().is_err() {
        return Err(GameError::new(GameErrorKind::InvalidCoordinate(format!("{y}{x}"))).into());
    }

    let coordinate = format!("{y}{x}");
    let result = blocking(&registry, move |r| r.strike(&id, &name, &target, &coordinate)).await?;
    Ok(Json(StrikeResponse {
        status: "OK".to_string(),
        result,
    }))
}

#[instrument(skip(registry))]
async fn get_opponent_board(
    State(registry): State<GameRegistry>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<Board>, ApiError> {
    let board = blocking(&registry, move |r| r.blind_board(&id, &name)).await?;
    Ok(Json(board))
}

#[instrument(skip(registry))]
async fn get_opponent_board_map(
    State(registry): State<GameRegistry>,
    Path((id, name)): Path<(String, String)>,
) -> Result<String, ApiError> {
    blocking(&registry, move |r| r.render_board(&id, &name, true)).await
}
