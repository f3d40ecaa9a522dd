// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::accounts::Account,
    services::account_service,
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str) -> AppResult<String> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST).await
}

pub async fn hash_password_with_cost(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt...");
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Autentica por username ou pelo email da pessoa associada.
/// Conta inexistente, inativa ou senha errada dão todas `InvalidCredentials`.
pub async fn authenticate(db_pool: &SqlitePool, login: &str, password: &str) -> AppResult<Account> {
    let account = match account_service::find_account_by_login(db_pool, login).await? {
        Some(account) => account,
        None => {
            tracing::warn!("Login: conta não encontrada para '{}'", login);
            return Err(AppError::InvalidCredentials);
        }
    };

    if !account.is_active {
        tracing::warn!("Login: conta '{}' inativa", account.username);
        return Err(AppError::InvalidCredentials);
    }

    if !verify_password(password, &account.password_hash).await? {
        tracing::warn!("Login: senha incorreta para '{}'", account.username);
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("✅ Login bem-sucedido para: {}", account.username);
    Ok(account)
}

/// Validade de um token, igual à inatividade máxima da sessão.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Emite um token opaco para `Authorization: Bearer`.
pub async fn issue_token(db_pool: &SqlitePool, username: &str) -> AppResult<String> {
    issue_token_for(db_pool, username, Duration::hours(TOKEN_TTL_HOURS)).await
}

async fn issue_token_for(
    db_pool: &SqlitePool,
    username: &str,
    ttl: Duration,
) -> AppResult<String> {
    let token = Uuid::new_v4().simple().to_string();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO api_tokens (token, username, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&token)
    .bind(username)
    .bind(now)
    .bind((now + ttl).timestamp())
    .execute(db_pool)
    .await?;
    tracing::debug!("Token emitido para {}", username);
    Ok(token)
}

/// Devolve a conta dona do token, se o token existir, não tiver expirado
/// e a conta estiver ativa.
pub async fn resolve_token(db_pool: &SqlitePool, token: &str) -> AppResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT u.username, u.password_hash, u.role, u.is_active, u.created_at,
               u.student, u.employee, u.assigned_trainer, u.assigned_at
        FROM api_tokens t
        JOIN users u ON u.username = t.username
        WHERE t.token = ?1 AND t.expires_at > ?2 AND u.is_active = 1
        "#,
    )
    .bind(token)
    .bind(Utc::now().timestamp())
    .fetch_optional(db_pool)
    .await?;
    Ok(account)
}

pub async fn revoke_token(db_pool: &SqlitePool, token: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM api_tokens WHERE token = ?1")
        .bind(token)
        .execute(db_pool)
        .await?;
    Ok(())
}

/// Apaga os tokens expirados. Devolve quantos foram removidos.
pub async fn purge_expired_tokens(db_pool: &SqlitePool) -> AppResult<u64> {
    let removed = sqlx::query("DELETE FROM api_tokens WHERE expires_at <= ?1")
        .bind(Utc::now().timestamp())
        .execute(db_pool)
        .await?
        .rows_affected();
    if removed > 0 {
        tracing::info!("🧹 {} tokens expirados removidos.", removed);
    }
    Ok(removed)
}

/// Limpa tokens expirados a cada `period`, até o processo terminar.
pub async fn continuously_purge_expired_tokens(
    db_pool: SqlitePool,
    period: std::time::Duration,
) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        if let Err(e) = purge_expired_tokens(&db_pool).await {
            tracing::error!("Erro na limpeza de tokens: {:?}", e);
        }
    }
}
