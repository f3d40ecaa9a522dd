// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult, HtmlError},
    models::accounts::{BackendUser, LoginRequest, LoginResponse},
    services::{account_service, auth_service},
    state::AppState,
    templates::LoginPage,
    web::mw_auth::{bearer_token, CurrentUser, SESSION_USER_KEY},
};
use askama::Template;
use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::Deserialize;
use tower_sessions::Session;

const INVALID_CREDENTIALS: &str = "Credenciales inválidas. Verifica tu correo y contraseña.";

async fn start_session(session: &Session, username: &str) -> AppResult<()> {
    // Novo ID de sessão a cada login
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, username)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao inserir na sessão: {}", e)))
}

// --- API ---

// POST /api/auth/login/
pub async fn api_login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    tracing::info!("Tentativa de login (API) para: {}", body.email);
    let account = auth_service::authenticate(&state.db_pool, &body.email, &body.password).await?;
    start_session(&session, &account.username).await?;
    let token = auth_service::issue_token(&state.db_pool, &account.username).await?;
    let user = account_service::backend_user(&state.db_pool, &account).await?;
    Ok(Json(LoginResponse { token, user }))
}

// POST /api/auth/logout/
// Idempotente: apaga o token enviado (se houver) e a sessão.
pub async fn api_logout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    if let Some(token) = bearer_token(&headers) {
        auth_service::revoke_token(&state.db_pool, token).await?;
    }
    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;
    tracing::info!("🚪 Logout (API) concluído.");
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/auth/me/
pub async fn api_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<BackendUser>> {
    let account = account_service::find_account(&state.db_pool, &user.username)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    Ok(Json(
        account_service::backend_user(&state.db_pool, &account).await?,
    ))
}

// --- Páginas ---

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn render_login(error: Option<String>, email: String) -> Result<Response, HtmlError> {
    let page = LoginPage { error, email };
    Ok(Html(page.render()?).into_response())
}

// GET /login
pub async fn show_login_form(session: Session) -> Result<Response, HtmlError> {
    if session
        .get::<String>(SESSION_USER_KEY)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        tracing::debug!("GET /login: utilizador já autenticado, redirecionando para /app");
        return Ok(Redirect::to("/app").into_response());
    }
    render_login(None, String::new())
}

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, HtmlError> {
    tracing::info!("Tentativa de login para: {}", form.email);
    match auth_service::authenticate(&state.db_pool, &form.email, &form.password).await {
        Ok(account) => {
            start_session(&session, &account.username).await?;
            Ok(Redirect::to("/app").into_response())
        }
        Err(AppError::InvalidCredentials) => {
            let mut response = render_login(Some(INVALID_CREDENTIALS.to_string()), form.email)?;
            *response.status_mut() = StatusCode::UNAUTHORIZED;
            Ok(response)
        }
        Err(e) => Err(e.into()),
    }
}

// GET /logout
pub async fn handle_logout(session: Session) -> Result<Redirect, HtmlError> {
    let user_id: Option<String> = session.get(SESSION_USER_KEY).await.ok().flatten();
    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("🚪 Utilizador '{}' desligado.", id),
        None => tracing::info!("🚪 Sessão anónima desligada."),
    }
    Ok(Redirect::to("/login"))
}
