// src/web/fitness_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        accounts::Role,
        fitness::{AdoptRequest, Routine},
        statistics::{InstructorStatistics, StatisticsFilter, UserStatistics},
    },
    services::{fitness_service, statistics_service},
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::SqlitePool;

// POST /api/fitness/routines/{id}/adopt/
// Cada um adota para si; só treinadores e administradores adotam para outros.
pub async fn adopt_routine(
    State(db_pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Path(routine_id): Path<String>,
    Json(body): Json<AdoptRequest>,
) -> AppResult<(StatusCode, Json<Routine>)> {
    if body.user_id != current.username
        && !matches!(current.role, Role::Instructor | Role::Admin)
    {
        tracing::warn!(
            "{} tentou adotar a rotina {} para {}.",
            current.username,
            routine_id,
            body.user_id
        );
        return Err(AppError::Unauthorized);
    }
    let copy = fitness_service::adopt_routine(&db_pool, &routine_id, &body.user_id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

// GET /api/fitness/statistics/users/?month=YYYY-MM
pub async fn user_statistics(
    State(db_pool): State<SqlitePool>,
    Query(filter): Query<StatisticsFilter>,
) -> AppResult<Json<Vec<UserStatistics>>> {
    let month = statistics_service::resolve_month(filter.month.as_deref())?;
    Ok(Json(
        statistics_service::user_statistics(&db_pool, &month).await?,
    ))
}

// GET /api/fitness/statistics/instructors/?month=YYYY-MM
pub async fn instructor_statistics(
    State(db_pool): State<SqlitePool>,
    Query(filter): Query<StatisticsFilter>,
) -> AppResult<Json<Vec<InstructorStatistics>>> {
    let month = statistics_service::resolve_month(filter.month.as_deref())?;
    Ok(Json(
        statistics_service::instructor_statistics(&db_pool, &month).await?,
    ))
}
