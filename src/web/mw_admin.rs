// src/web/mw_admin.rs
use crate::{error::AppError, models::accounts::Role, web::mw_auth::CurrentUser};
use axum::{extract::Request, middleware::Next, response::Response, Extension};

/// Só deixa passar administradores. Corre depois de `require_api_auth`.
pub async fn require_admin(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.role == Role::Admin {
        tracing::debug!("Admin MW: acesso concedido para {}", user.username);
        Ok(next.run(request).await)
    } else {
        tracing::warn!(
            "Admin MW: acesso negado para {} (papel {}).",
            user.username,
            user.role.as_str()
        );
        Err(AppError::Unauthorized)
    }
}
