use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use common::log;

use crate::api;
use crate::game_session_manager::GameSessionManager;
use crate::server_config::TelegramSettings;
use crate::telegram::{LinkRegistry, Notifier};

#[derive(Clone)]
pub struct WebServerState {
    pub session_manager: GameSessionManager,
    pub link_registry: LinkRegistry,
    pub notifier: Arc<dyn Notifier>,
    pub telegram: TelegramSettings,
}

pub fn build_router(state: WebServerState, static_files_path: Option<&str>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/games", post(api::create_game))
        .route("/api/games/{game_id}", get(api::get_game).delete(api::delete_game))
        .route("/api/games/{game_id}/moves", post(api::play_move))
        .route("/api/games/{game_id}/reset", post(api::reset_game))
        .route("/api/telegram/links", post(api::create_link))
        .route("/api/telegram/links/{code}", get(api::link_status))
        .route("/api/telegram/webhook", post(api::telegram_webhook));

    if let Some(path) = static_files_path {
        log!("Serving static files from {}", path);
        app = app.nest_service("/ui", ServeDir::new(path));
    }

    app.layer(cors).with_state(state)
}

pub async fn run_web_server(
    state: WebServerState,
    bind_address: &str,
    static_files_path: Option<&str>,
) -> Result<(), String> {
    let app = build_router(state, static_files_path);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| format!("Failed to bind web server address {}: {}", bind_address, e))?;
    log!("Web server listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Web server error: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use common::engine::tictactoe::FirstPlayerMode;

    use crate::promo::PromoIssuer;
    use crate::server_config::PromoSettings;
    use crate::telegram::LogNotifier;

    fn router(telegram_enabled: bool) -> Router {
        let telegram = TelegramSettings {
            enabled: telegram_enabled,
            ..TelegramSettings::default()
        };
        let state = WebServerState {
            session_manager: GameSessionManager::new(
                PromoIssuer::new(PromoSettings::default()),
                FirstPlayerMode::Human,
            ),
            link_registry: LinkRegistry::new(
                telegram.link_code_length,
                telegram.link_code_ttl(),
                telegram.linked_code_ttl(),
            ),
            notifier: Arc::new(LogNotifier),
            telegram,
        };
        build_router(state, None)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_game_routes_full_round_trip() {
        let app = router(false);

        let (status, game) = send(&app, "POST", "/api/games", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(game["status"], "in_progress");
        assert_eq!(game["human_mark"], "X");
        assert_eq!(game["move_count"], 0);
        let game_id = game["game_id"].as_str().unwrap().to_string();
        let game_uri = format!("/api/games/{}", game_id);

        let (status, fetched) = send(&app, "GET", &game_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["game_id"], game_id.as_str());

        let (status, moved) = send(
            &app,
            "POST",
            &format!("{}/moves", game_uri),
            Some(json!({ "index": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["board"][4], "X");
        assert_eq!(moved["move_count"], 2);
        assert_eq!(moved["last_move"], moved["last_ai_move"]);

        let (status, reset) = send(&app, "POST", &format!("{}/reset", game_uri), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset["game_id"], game_id.as_str());
        assert_eq!(reset["move_count"], 0);

        let (status, reset) = send(
            &app,
            "POST",
            &format!("{}/reset", game_uri),
            Some(json!({ "first_player": "ai" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset["ai_mark"], "X");
        assert_eq!(reset["move_count"], 1);

        let (status, body) = send(&app, "DELETE", &game_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, "GET", &game_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains(&game_id));
    }

    #[tokio::test]
    async fn test_create_game_accepts_json_body() {
        let app = router(false);

        let (status, game) = send(&app, "POST", "/api/games", Some(json!({ "first_player": "ai" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(game["ai_mark"], "X");
        assert_eq!(game["move_count"], 1);

        let (status, game) = send(&app, "POST", "/api/games", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(game["human_mark"], "X");
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_rejected() {
        let app = router(false);
        let request = Request::builder()
            .method("POST")
            .uri("/api/games")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_game_routes_return_not_found() {
        let app = router(false);

        for (method, uri, body) in [
            ("GET", "/api/games/missing", None),
            ("DELETE", "/api/games/missing", None),
            ("POST", "/api/games/missing/reset", None),
            ("POST", "/api/games/missing/moves", Some(json!({ "index": 0 }))),
        ] {
            let (status, body) = send(&app, method, uri, body).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_occupied_cell_is_bad_request() {
        let app = router(false);
        let (_, game) = send(&app, "POST", "/api/games", None).await;
        let moves_uri = format!("/api/games/{}/moves", game["game_id"].as_str().unwrap());

        send(&app, "POST", &moves_uri, Some(json!({ "index": 0 }))).await;
        let (status, body) = send(&app, "POST", &moves_uri, Some(json!({ "index": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_telegram_link_routes() {
        let app = router(true);

        let (status, link) = send(&app, "POST", "/api/telegram/links", None).await;
        assert_eq!(status, StatusCode::OK);
        let code = link["code"].as_str().unwrap().to_string();
        let status_uri = format!("/api/telegram/links/{}", code.to_ascii_lowercase());

        let (status, body) = send(&app, "GET", &status_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "pending" }));

        let update = json!({
            "update_id": 7,
            "message": { "chat": { "id": 42 }, "text": format!("/start {}", code) }
        });
        let (status, _) = send(&app, "POST", "/api/telegram/webhook", Some(update)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", &status_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "linked", "chat_id": 42 }));

        let (status, _) = send(&app, "GET", "/api/telegram/links/UNKNOWN", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_telegram_routes_when_disabled() {
        let app = router(false);

        let (status, _) = send(&app, "POST", "/api/telegram/links", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "POST", "/api/telegram/webhook", Some(json!({ "update_id": 1 }))).await;
        assert_eq!(status, StatusCode::OK);
    }
}
