use crate::error::ApiResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::template::{load_template, render_welcome};
use axum::{extract::State, response::Html};

/// `GET /tareas`
///
/// The welcome page. `AuthenticatedUser` has already checked the Basic credentials
/// by the time we get here.
pub async fn tareas(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<Html<String>> {
    let template = load_template(&state.template_path).await?;
    Ok(Html(render_welcome(&template, &user.username)))
}
