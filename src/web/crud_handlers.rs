// src/web/crud_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::crud::CrudService,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sqlx::SqlitePool;

// GET /res/
pub async fn list<S: CrudService>(
    State(db_pool): State<SqlitePool>,
    Query(filter): Query<S::Filter>,
) -> AppResult<Json<Vec<S::Record>>> {
    Ok(Json(S::list(&db_pool, filter).await?))
}

// GET /res/{id}/
pub async fn fetch<S: CrudService>(
    State(db_pool): State<SqlitePool>,
    Path(key): Path<S::Key>,
) -> AppResult<Json<S::Record>> {
    match S::find(&db_pool, &key).await? {
        Some(record) => Ok(Json(record)),
        None => {
            tracing::debug!("{} '{}' não encontrado.", S::RESOURCE, key);
            Err(AppError::NotFound(S::RESOURCE.to_string()))
        }
    }
}

// POST /res/
pub async fn create<S: CrudService>(
    State(db_pool): State<SqlitePool>,
    Json(payload): Json<S::Payload>,
) -> AppResult<(StatusCode, Json<S::Record>)> {
    let record = S::create(&db_pool, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

// PUT /res/{id}/
pub async fn update<S: CrudService>(
    State(db_pool): State<SqlitePool>,
    Path(key): Path<S::Key>,
    Json(payload): Json<S::Payload>,
) -> AppResult<Json<S::Record>> {
    Ok(Json(S::update(&db_pool, &key, payload).await?))
}

// DELETE /res/{id}/
pub async fn remove<S: CrudService>(
    State(db_pool): State<SqlitePool>,
    Path(key): Path<S::Key>,
) -> AppResult<StatusCode> {
    S::delete(&db_pool, &key).await?;
    tracing::info!("🗑️ {} '{}' apagado.", S::RESOURCE, key);
    Ok(StatusCode::NO_CONTENT)
}

/// Regista `{base}/` e `{base}/{id}/` para o serviço `S`.
pub fn crud_routes<S: CrudService>(router: Router<AppState>, base: &str) -> Router<AppState> {
    router
        .route(&format!("{base}/"), get(list::<S>).post(create::<S>))
        .route(
            &format!("{base}/{{id}}/"),
            get(fetch::<S>).put(update::<S>).delete(remove::<S>),
        )
}
