use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::services::CommentService;

#[derive(Clone)]
pub struct AppState {
    pub comments: Arc<CommentService>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<CommentService> {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
