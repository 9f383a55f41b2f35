use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ChessError;
use crate::models::app_state::AppState;
use crate::models::messages::{ChessWebSocketMessage, UserGameCommand};
use crate::websocket::registry::{ConnectionId, DeliveryError, MessageSink};

/// Frames for a connection are queued on its actor's mailbox
impl MessageSink for Recipient<ChessWebSocketMessage> {
    fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        if !self.connected() {
            return Err(DeliveryError::Closed);
        }
        self.do_send(ChessWebSocketMessage(payload.to_string()));
        Ok(())
    }
}

/// WebSocket handler for chess games
pub struct ChessWebSocket {
    pub id: ConnectionId,
    pub app_state: web::Data<AppState>,
    last_heartbeat: Instant,
}

impl ChessWebSocket {
    pub fn new(app_state: web::Data<AppState>) -> Self {
        Self {
            id: ConnectionId::new(),
            app_state,
            last_heartbeat: Instant::now(),
        }
    }

    fn heartbeat_interval(&self) -> Duration {
        self.app_state.config.heartbeat_interval
    }

    fn client_timeout(&self) -> Duration {
        self.app_state.config.client_timeout
    }

    /// Ping on an interval; stop the actor once the client has gone quiet
    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat_interval(), |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > act.client_timeout() {
                warn!("Connection {} timed out, closing", act.id);
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn handle_text(&mut self, text: &str) {
        match serde_json::from_str::<UserGameCommand>(text) {
            Ok(command) => self.app_state.dispatcher.dispatch(&self.id, command),
            Err(e) => {
                let err = ChessError::BadRequest(format!("invalid command: {}", e));
                self.app_state.dispatcher.reject(&self.id, &err);
            }
        }
    }
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let recipient: Recipient<ChessWebSocketMessage> = ctx.address().recipient();
        self.app_state
            .registry
            .register(self.id.clone(), Arc::new(recipient));
        self.start_heartbeat(ctx);
        info!("WebSocket connection started: {}", self.id);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        // implicit leave: no notification, the reason is unknown
        if let Some(game_id) = self.app_state.registry.disconnect(&self.id) {
            info!("Removed connection {} from game {}", self.id, game_id);
        }
        info!("WebSocket connection closed: {}", self.id);
        Running::Stop
    }
}

impl Handler<ChessWebSocketMessage> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: ChessWebSocketMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                let err = ChessError::BadRequest("binary frames are not supported".to_string());
                self.app_state.dispatcher.reject(&self.id, &err);
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!("Protocol error on {}: {}", self.id, e);
                ctx.stop();
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let ws = ChessWebSocket::new(app_state);
    info!("New WebSocket connection: {}", ws.id);
    ws::start(ws, &req, stream)
}
