use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Query, Request, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Router,
};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::deploy::{DeployError, DeployScript};
use crate::event::PullRequestEvent;

pub const REDEPLOY_PATH: &str = "/manage/redeploy";
pub const AUTH_TOKEN_PARAM: &str = "auth-token";

/// Largest payload GitHub will deliver to a webhook.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

struct AppState {
    auth_token: String,
    script: DeployScript,
}

pub fn router(config: &Config) -> Router {
    let state = Arc::new(AppState {
        auth_token: config.auth_token.clone(),
        script: DeployScript::new(&config.deploy_script),
    });

    Router::new()
        .route(REDEPLOY_PATH, any(redeploy))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!(path = %uri, "got request to unknown path");
    (StatusCode::NOT_FOUND, "Nothing to see here -_-\n")
}

async fn redeploy(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
    request: Request,
) -> impl IntoResponse {
    // A repeated parameter resolves to its first value.
    let token = params
        .into_iter()
        .find_map(|(name, value)| (name == AUTH_TOKEN_PARAM).then_some(value));
    let Some(token) = token else {
        debug!("got request without auth token");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            "No auth token provided\n".to_string(),
        );
    };

    if token != state.auth_token {
        debug!("got request with invalid token");
        return (StatusCode::UNAUTHORIZED, "Invalid token\n".to_string());
    }

    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "failed to read request body");
            return (
                StatusCode::BAD_REQUEST,
                format!("Failed to read body: {}\n", e),
            );
        }
    };
    debug!(body = %String::from_utf8_lossy(&body), "got body");

    let event = match PullRequestEvent::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "invalid json");
            return (StatusCode::BAD_REQUEST, format!("Invalid json: {}\n", e));
        }
    };
    debug!(?event, "relevant pull request info");

    if !event.is_production_merge() {
        debug!(
            action = %event.action,
            merged = event.merged(),
            base = %event.base_branch(),
            "pull request action does not apply"
        );
        return (StatusCode::OK, "Not an applicable PR action\n".to_string());
    }

    info!(script = %state.script.path().display(), "redeploying");
    match state.script.run().await {
        Ok(output) => {
            info!(stdout = %output.stdout, stderr = %output.stderr, "deployment output");
            info!("redeployed");
            (StatusCode::OK, "Redeployed\n".to_string())
        }
        Err(e) => {
            match &e {
                DeployError::Spawn { .. } => {
                    error!(error = %e, "failed to start deployment script, is it missing?")
                }
                _ => error!(error = %e, "deployment script failed"),
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Deployment failed\n".to_string(),
            )
        }
    }
}
