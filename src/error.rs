// src/error.rs
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Configuração inválida: {0}")]
    ConfigError(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Erro na sessão: {0}")]
    SessionError(String),

    #[error("Dados inválidos: {0}")]
    Validation(String),

    #[error("{0} não encontrado")]
    NotFound(String),

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro ao renderizar template: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Não autenticado")]
    Unauthenticated,

    #[error("Não autorizado")]
    Unauthorized,

    #[error("Erro interno inesperado")]
    InternalServerError,
}

impl AppError {
    /// Estado HTTP e mensagem segura para o cliente.
    /// Os detalhes internos só vão para o log.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::SqlxError(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "Registo não encontrado.".to_string())
            }
            AppError::SqlxError(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                (StatusCode::CONFLICT, "O registo já existe.".to_string())
            }
            AppError::SqlxError(sqlx::Error::Database(db_err))
                if db_err.is_foreign_key_violation() =>
            {
                (
                    StatusCode::BAD_REQUEST,
                    "Referência inválida para outro registo.".to_string(),
                )
            }
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao aceder aos dados.".to_string(),
            ),
            AppError::EnvVarError(_) | AppError::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro de configuração.".to_string(),
            ),
            AppError::PasswordHashingError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro ao processar credenciais.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Credenciais inválidas.".to_string(),
            ),
            AppError::SessionError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro na gestão da sua sessão.".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} não encontrado.", what)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Autenticação necessária.".to_string(),
            ),
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "Acesso negado.".to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ocorreu um erro inesperado.".to_string(),
            ),
        }
    }
}

// 5xx é erro nosso; 4xx é só o pedido recusado
fn log_rejection(status: StatusCode, err: &AppError) {
    if status.is_server_error() {
        tracing::error!("Erro processado: {:?}", err);
    } else {
        tracing::debug!("Pedido rejeitado ({}): {:?}", status, err);
    }
}

// Respostas da API REST são sempre JSON: {"error": "..."}
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, user_message) = self.status_and_message();
        log_rejection(status, &self);
        (status, Json(json!({ "error": user_message }))).into_response()
    }
}

/// Erro para as páginas HTML. Mesmo mapeamento de estado que `AppError`,
/// mas devolve uma página simples em vez de JSON.
#[derive(Debug)]
pub struct HtmlError(pub AppError);

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        HtmlError(err)
    }
}

impl From<askama::Error> for HtmlError {
    fn from(err: askama::Error) -> Self {
        HtmlError(AppError::TemplateError(err))
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let (status, user_message) = self.0.status_and_message();
        log_rejection(status, &self.0);
        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Erro</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Erro {status_code}</h1><p>{message}</p><a href="javascript:history.back()">Voltar</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn html_error_keeps_client_status() {
        let response = HtmlError(AppError::NotFound("Rotina".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));

        let response = HtmlError(AppError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_details_stay_out_of_the_message() {
        let (status, message) = AppError::ConfigError("SESSION_SECRET curto".into())
            .status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("SESSION_SECRET"));
    }
}
