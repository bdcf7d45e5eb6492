use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let chats = Router::new()
        .route(
            "/",
            get(handlers::chats::list_chats).post(handlers::chats::create_chat),
        )
        .route(
            "/{chatId}",
            get(handlers::chats::get_chat).delete(handlers::chats::delete_chat),
        )
        .route(
            "/{chatId}/messages",
            get(handlers::messages::list_messages).post(handlers::messages::send_message),
        );

    // The websocket endpoint authenticates via query-param token, so it is
    // mounted outside the bearer middleware.
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/chats/{chatId}/ws", get(handlers::ws::chat_ws))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .nest("/chats", chats)
        .route("/voice:transcribe", post(handlers::voice::transcribe))
        .route("/voice:synthesize", post(handlers::voice::synthesize))
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
