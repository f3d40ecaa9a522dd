// src/web/mw_auth.rs
use crate::{
    error::{AppError, AppResult, HtmlError},
    models::accounts::{Account, Role},
    services::{account_service, auth_service},
    state::AppState,
};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Chave da sessão com o username autenticado.
pub const SESSION_USER_KEY: &str = "user_id";

/// Utilizador autenticado, posto nas extensões do pedido.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
}

/// Token de `Authorization: Bearer <token>`, se existir.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn current_user(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
) -> AppResult<Option<CurrentUser>> {
    let account: Option<Account> = if let Some(token) = bearer_token(headers) {
        auth_service::resolve_token(&state.db_pool, token).await?
    } else {
        let username = session
            .get::<String>(SESSION_USER_KEY)
            .await
            .map_err(|e| AppError::SessionError(format!("Erro ao verificar sessão: {}", e)))?;
        match username {
            Some(username) => account_service::find_account(&state.db_pool, &username)
                .await?
                .filter(|a| a.is_active),
            None => None,
        }
    };

    match account {
        Some(account) => {
            let role = account_service::resolve_role(&state.db_pool, &account).await?;
            Ok(Some(CurrentUser {
                username: account.username,
                role,
            }))
        }
        None => Ok(None),
    }
}

/// API: sem sessão nem token válido responde 401 em JSON.
pub async fn require_api_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match current_user(&state, &session, request.headers()).await? {
        Some(user) => {
            tracing::debug!("Autenticação API: '{}' ({})", user.username, user.role.as_str());
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!("Autenticação API: pedido sem credenciais válidas.");
            Err(AppError::Unauthenticated)
        }
    }
}

/// Páginas: sem sessão redireciona para /login.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, HtmlError> {
    match current_user(&state, &session, request.headers()).await? {
        Some(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!("Autenticação MW: não autenticado. Redirecionando para /login");
            Ok(Redirect::to("/login").into_response())
        }
    }
}
