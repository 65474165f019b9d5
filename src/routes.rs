// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{comments, reactions},
    state::AppState,
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

/// Assembles the main application router.
///
/// * Read routes accept anonymous viewers; write routes require a token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (comment service + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let optional_auth = middleware::from_fn_with_state(state.clone(), optional_auth_middleware);
    let required_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let comment_routes = Router::new()
        .route(
            "/product/{product_id}",
            get(comments::list_root_comments)
                .route_layer(optional_auth.clone())
                .merge(post(comments::create_comment).route_layer(required_auth.clone())),
        )
        .route(
            "/{comment_id}/answers",
            get(comments::list_answers).route_layer(optional_auth),
        )
        .route(
            "/{comment_id}",
            put(comments::edit_comment)
                .merge(delete(comments::delete_comment))
                .route_layer(required_auth.clone()),
        );

    let reaction_routes = Router::new().route(
        "/{comment_id}",
        post(reactions::set_reaction).route_layer(required_auth),
    );

    Router::new()
        .nest("/api/comments", comment_routes)
        .nest("/api/reactions", reaction_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, services::CommentService, store::MemoryStore};

    fn app() -> Router {
        let config = Config {
            database_url: String::new(),
            jwt_secret: "router_test_secret".to_string(),
            rust_log: "error".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            db_max_connections: 1,
        };
        let service = CommentService::with_store(Arc::new(MemoryStore::new()));
        create_router(AppState {
            comments: Arc::new(service),
            config,
        })
    }

    #[tokio::test]
    async fn reading_needs_no_token() {
        let response = app()
            .oneshot(
                Request::get("/api/comments/product/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn writing_needs_a_token() {
        let response = app()
            .oneshot(
                Request::post("/api/reactions/1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"type":"like"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app()
            .oneshot(
                Request::delete("/api/comments/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
