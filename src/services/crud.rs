// src/services/crud.rs
use crate::error::AppResult;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::fmt::Display;

/// Operações de um recurso REST (`GET/POST /res/`, `GET/PUT/DELETE /res/{id}/`).
/// Os handlers genéricos em `web::crud_handlers` servem qualquer implementação.
#[async_trait]
pub trait CrudService: Send + Sync + 'static {
    type Record: Serialize + Send;
    type Payload: DeserializeOwned + Send + 'static;
    type Filter: DeserializeOwned + Send + 'static;
    type Key: DeserializeOwned + Display + Send + Sync + 'static;

    /// Nome usado nas mensagens e nos logs.
    const RESOURCE: &'static str;

    async fn list(db_pool: &SqlitePool, filter: Self::Filter) -> AppResult<Vec<Self::Record>>;

    async fn find(db_pool: &SqlitePool, key: &Self::Key) -> AppResult<Option<Self::Record>>;

    async fn create(db_pool: &SqlitePool, payload: Self::Payload) -> AppResult<Self::Record>;

    /// Substitui o recurso inteiro. `NotFound` se não existir.
    async fn update(
        db_pool: &SqlitePool,
        key: &Self::Key,
        payload: Self::Payload,
    ) -> AppResult<Self::Record>;

    /// `NotFound` se não existir.
    async fn delete(db_pool: &SqlitePool, key: &Self::Key) -> AppResult<()>;
}

/// Filtro vazio para recursos sem parâmetros de listagem.
/// Ignora qualquer querystring recebida.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoFilter {}

/// Acrescenta `AND column = ?` quando o filtro está presente.
/// A query tem de já conter um `WHERE`.
pub fn and_eq<'a, T>(qb: &mut QueryBuilder<'a, Sqlite>, column: &str, value: Option<T>)
where
    T: 'a + sqlx::Encode<'a, Sqlite> + sqlx::Type<Sqlite> + Send,
{
    if let Some(value) = value {
        qb.push(" AND ").push(column).push(" = ").push_bind(value);
    }
}

/// Converte `rows_affected == 0` em `NotFound`.
pub fn ensure_found(rows_affected: u64, resource: &str, key: &dyn Display) -> AppResult<()> {
    if rows_affected == 0 {
        tracing::warn!("{} '{}' não encontrado.", resource, key);
        Err(crate::error::AppError::NotFound(resource.to_string()))
    } else {
        Ok(())
    }
}

/// Nome obrigatório: recusa strings vazias.
pub fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(crate::error::AppError::Validation(format!(
            "O campo '{}' é obrigatório.",
            field
        )))
    } else {
        Ok(())
    }
}
