use actix_files as fs;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::error::ChessError;
use crate::game::Color;
use crate::models::app_state::AppState;
use crate::models::game_state::GameId;
use crate::store::{AuthLookup, StoreError};

#[derive(Deserialize, Debug)]
pub struct SessionRequest {
    pub username: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub game_name: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    pub player_color: Color,
    #[serde(rename = "gameID")]
    pub game_id: GameId,
}

/// HTTP handler for the index page
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Chess Web App")
}

/// Issue an auth token for a username
pub async fn create_session(
    app_state: web::Data<AppState>,
    body: web::Json<SessionRequest>,
) -> Result<HttpResponse, ChessError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ChessError::BadRequest("username required".to_string()));
    }
    let token = app_state.store.issue_token(username);
    Ok(HttpResponse::Ok().json(json!({ "username": username, "authToken": token })))
}

pub async fn list_games(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ChessError> {
    authorize(&req, &app_state)?;
    Ok(HttpResponse::Ok().json(json!({ "games": app_state.store.list_games() })))
}

pub async fn create_game(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: web::Json<CreateGameRequest>,
) -> Result<HttpResponse, ChessError> {
    let username = authorize(&req, &app_state)?;
    let game_id = app_state
        .store
        .create_game(&body.game_name)
        .map_err(|e| match e {
            StoreError::BlankName => ChessError::BadRequest(e.to_string()),
            other => ChessError::Storage(other),
        })?;
    info!("{} created game {}", username, game_id);
    Ok(HttpResponse::Ok().json(json!({ "gameID": game_id })))
}

pub async fn join_game(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: web::Json<JoinGameRequest>,
) -> Result<HttpResponse, ChessError> {
    let token = auth_header(&req).ok_or(ChessError::Unauthorized)?;
    app_state
        .dispatcher
        .claim_seat(token, body.player_color, body.game_id)?;
    Ok(HttpResponse::Ok().json(json!({})))
}

fn auth_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
}

fn authorize(req: &HttpRequest, app_state: &AppState) -> Result<String, ChessError> {
    auth_header(req)
        .and_then(|token| app_state.store.resolve_identity(token))
        .ok_or(ChessError::Unauthorized)
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: &str) {
    cfg.service(web::resource("/ws").route(web::get().to(crate::websocket::ws_index)))
        .service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/session").route(web::post().to(create_session)))
        .service(
            web::resource("/game")
                .route(web::get().to(list_games))
                .route(web::post().to(create_game))
                .route(web::put().to(join_game)),
        )
        .service(fs::Files::new("/static", static_dir));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(ServerConfig::default()))
    }

    #[actix_rt::test]
    async fn session_then_create_and_join() {
        let app_state = state();
        let app = test::init_service(
            App::new()
                .app_data(app_state.clone())
                .configure(|cfg| configure_routes(cfg, "./static")),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/session")
            .set_json(json!({ "username": "alice" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let token = body["authToken"].as_str().unwrap().to_string();
        assert_eq!(body["username"], "alice");

        let req = test::TestRequest::post()
            .uri("/game")
            .insert_header(("authorization", token.as_str()))
            .set_json(json!({ "gameName": "friendly" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["gameID"], 1);

        let req = test::TestRequest::put()
            .uri("/game")
            .insert_header(("authorization", token.as_str()))
            .set_json(json!({ "playerColor": "WHITE", "gameID": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/game")
            .insert_header(("authorization", token.as_str()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["games"][0]["whiteUsername"], "alice");
    }

    #[actix_rt::test]
    async fn missing_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .configure(|cfg| configure_routes(cfg, "./static")),
        )
        .await;
        let req = test::TestRequest::get().uri("/game").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn taken_seat_is_forbidden() {
        let app_state = state();
        let alice = app_state.store.issue_token("alice");
        let bob = app_state.store.issue_token("bob");
        app_state.store.create_game("g").unwrap();
        app_state.dispatcher.claim_seat(&alice, Color::Black, 1).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(app_state.clone())
                .configure(|cfg| configure_routes(cfg, "./static")),
        )
        .await;
        let req = test::TestRequest::put()
            .uri("/game")
            .insert_header(("authorization", bob.as_str()))
            .set_json(json!({ "playerColor": "BLACK", "gameID": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
