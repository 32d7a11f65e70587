use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use common::engine::tictactoe::FirstPlayerMode;
use common::{log, GameId, LinkCode};

use crate::api_error::ApiError;
use crate::game_session_manager::GameSnapshot;
use crate::telegram::{spawn_delivery, BotCommand, LinkStatus, TelegramUpdate};
use crate::web_server::WebServerState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewRoundRequest {
    pub first_player: Option<FirstPlayerMode>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub index: usize,
    #[serde(default)]
    pub link_code: Option<LinkCode>,
}

#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub code: LinkCode,
}

/// The body is optional; a request without a JSON content type uses the defaults.
fn new_round_request(
    body: Result<Json<NewRoundRequest>, JsonRejection>,
) -> Result<NewRoundRequest, ApiError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(NewRoundRequest::default()),
        Err(e) => Err(ApiError::new(e.status(), e.body_text())),
    }
}

pub async fn create_game(
    State(state): State<WebServerState>,
    body: Result<Json<NewRoundRequest>, JsonRejection>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let request = new_round_request(body)?;
    let snapshot = state.session_manager.create_game(request.first_player).await?;
    Ok(Json(snapshot))
}

pub async fn get_game(
    State(state): State<WebServerState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let snapshot = state.session_manager.get_game(&game_id).await?;
    Ok(Json(snapshot))
}

pub async fn play_move(
    State(state): State<WebServerState>,
    Path(game_id): Path<GameId>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let result = state
        .session_manager
        .play_move(&game_id, request.index)
        .await?;

    if result.promo_issued
        && state.telegram.enabled
        && let Some(link_code) = request.link_code.as_ref()
        && let Some(promo_code) = result.snapshot.promo_code.as_ref()
    {
        match state.link_registry.linked_chat(link_code).await {
            Some(chat_id) => spawn_delivery(
                state.notifier.clone(),
                chat_id,
                format!("You beat the machine! Your promo code: {}", promo_code),
                state.telegram.notify_timeout(),
            ),
            None => log!("Link code {} is not linked, promo not sent", link_code),
        }
    }

    Ok(Json(result.snapshot))
}

pub async fn reset_game(
    State(state): State<WebServerState>,
    Path(game_id): Path<GameId>,
    body: Result<Json<NewRoundRequest>, JsonRejection>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let request = new_round_request(body)?;
    let snapshot = state
        .session_manager
        .reset_game(&game_id, request.first_player)
        .await?;
    Ok(Json(snapshot))
}

pub async fn delete_game(
    State(state): State<WebServerState>,
    Path(game_id): Path<GameId>,
) -> Result<StatusCode, ApiError> {
    if state.session_manager.remove_game(&game_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Game {} not found", game_id)))
    }
}

pub async fn create_link(
    State(state): State<WebServerState>,
) -> Result<Json<CreateLinkResponse>, ApiError> {
    if !state.telegram.enabled {
        return Err(ApiError::not_found("Telegram integration is disabled"));
    }
    let code = state.link_registry.create_link().await;
    Ok(Json(CreateLinkResponse { code }))
}

pub async fn link_status(
    State(state): State<WebServerState>,
    Path(code): Path<String>,
) -> Result<Json<LinkStatus>, ApiError> {
    if !state.telegram.enabled {
        return Err(ApiError::not_found("Telegram integration is disabled"));
    }
    let code = LinkCode::new(code.to_ascii_uppercase());
    state
        .link_registry
        .status(&code)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Unknown link code {}", code)))
}

/// Bot webhook. Always answers 200 so Telegram does not redeliver.
pub async fn telegram_webhook(
    State(state): State<WebServerState>,
    update: Result<Json<TelegramUpdate>, JsonRejection>,
) -> StatusCode {
    if !state.telegram.enabled {
        return StatusCode::OK;
    }

    let update = match update {
        Ok(Json(update)) => update,
        Err(e) => {
            log!("Ignoring malformed Telegram update: {}", e);
            return StatusCode::OK;
        }
    };

    let Some(command) = update.command() else {
        return StatusCode::OK;
    };

    let (chat_id, reply) = match command {
        BotCommand::Link { chat_id, code } => {
            let reply = match state.link_registry.confirm(&code, chat_id).await {
                Ok(()) => "Linked! Win a round and your promo code will arrive here.".to_string(),
                Err(e) => {
                    log!("Update {}: {}", update.update_id, e);
                    "That link code is invalid or expired. Get a fresh one in the game.".to_string()
                }
            };
            (chat_id, reply)
        }
        BotCommand::Help { chat_id } => (
            chat_id,
            "Open the game, press \"Link Telegram\" and send me the code it shows.".to_string(),
        ),
    };

    spawn_delivery(
        state.notifier.clone(),
        chat_id,
        reply,
        state.telegram.notify_timeout(),
    );
    StatusCode::OK
}
