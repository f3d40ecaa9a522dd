// src/services/fitness_service.rs
use crate::{
    error::{AppError, AppResult},
    models::fitness::{
        Exercise, ExerciseFilter, ExerciseFrequency, ExercisePayload, FollowUp, FollowUpPayload,
        ProgressFilter, ProgressLog, ProgressPayload, ProgressSummary, RecommendationPayload, Routine, RoutineExercise,
        RoutineFilter, RoutinePayload, RoutineRow, TrainerFilter, TrainerRecommendation,
        MAX_EFFORT_LEVEL, MIN_EFFORT_LEVEL, SYSTEM_AUTHOR,
    },
    services::crud::{and_eq, ensure_found, require_text, CrudService},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn ensure_non_negative_int(field: &str, value: Option<i64>) -> AppResult<()> {
    match value {
        Some(v) if v < 0 => Err(AppError::Validation(format!(
            "O campo '{}' não pode ser negativo.",
            field
        ))),
        _ => Ok(()),
    }
}

fn ensure_non_negative(field: &str, value: Option<f64>) -> AppResult<()> {
    match value {
        Some(v) if v < 0.0 || !v.is_finite() => Err(AppError::Validation(format!(
            "O campo '{}' tem de ser um número finito e não negativo.",
            field
        ))),
        _ => Ok(()),
    }
}

// --- Exercícios ---

const EXERCISE_SELECT: &str = "SELECT id, name, type, description, duration, difficulty, \
     video_url, created_by, (created_by != 'system') AS is_custom, created_at FROM exercises";

fn validate_exercise(payload: &ExercisePayload) -> AppResult<()> {
    require_text("name", &payload.name)?;
    require_text("created_by", &payload.created_by)?;
    ensure_non_negative("duration", payload.duration)
}

pub struct Exercises;

#[async_trait]
impl CrudService for Exercises {
    type Record = Exercise;
    type Payload = ExercisePayload;
    type Filter = ExerciseFilter;
    type Key = String;

    const RESOURCE: &'static str = "Exercício";

    async fn list(db_pool: &SqlitePool, filter: ExerciseFilter) -> AppResult<Vec<Exercise>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(EXERCISE_SELECT);
        qb.push(" WHERE 1 = 1");
        and_eq(&mut qb, "difficulty", filter.difficulty);
        and_eq(&mut qb, "type", filter.kind);
        and_eq(&mut qb, "created_by", filter.created_by);
        qb.push(" ORDER BY name ASC");
        let exercises = qb.build_query_as::<Exercise>().fetch_all(db_pool).await?;
        tracing::debug!("Encontrados {} exercícios.", exercises.len());
        Ok(exercises)
    }

    async fn find(db_pool: &SqlitePool, id: &String) -> AppResult<Option<Exercise>> {
        Ok(
            sqlx::query_as::<_, Exercise>(&format!("{EXERCISE_SELECT} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(db_pool)
                .await?,
        )
    }

    async fn create(db_pool: &SqlitePool, payload: ExercisePayload) -> AppResult<Exercise> {
        validate_exercise(&payload)?;
        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO exercises (id, name, type, description, duration, difficulty,
                                   video_url, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(payload.name.trim())
        .bind(payload.kind)
        .bind(&payload.description)
        .bind(payload.duration)
        .bind(payload.difficulty)
        .bind(&payload.video_url)
        .bind(&payload.created_by)
        .bind(Utc::now())
        .execute(db_pool)
        .await?;
        tracing::info!("✅ Exercício '{}' criado por {}.", payload.name, payload.created_by);
        Self::find(db_pool, &id)
            .await?
            .ok_or(AppError::InternalServerError)
    }

    async fn update(
        db_pool: &SqlitePool,
        id: &String,
        payload: ExercisePayload,
    ) -> AppResult<Exercise> {
        validate_exercise(&payload)?;
        let rows = sqlx::query(
            r#"
            UPDATE exercises
            SET name = ?1, type = ?2, description = ?3, duration = ?4, difficulty = ?5,
                video_url = ?6, created_by = ?7
            WHERE id = ?8
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.kind)
        .bind(&payload.description)
        .bind(payload.duration)
        .bind(payload.difficulty)
        .bind(&payload.video_url)
        .bind(&payload.created_by)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)?;
        Self::find(db_pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(Self::RESOURCE.into()))
    }

    async fn delete(db_pool: &SqlitePool, id: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM exercises WHERE id = ?1")
            .bind(id)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)
    }
}

// --- Rotinas ---

const ROUTINE_SELECT: &str = "SELECT id, name, description, user_id, exercises, \
     is_pre_designed, created_by, base_routine_id, created_at FROM routines";

fn validate_routine(payload: &RoutinePayload) -> AppResult<()> {
    require_text("name", &payload.name)?;
    require_text("created_by", &payload.created_by)?;
    validate_routine_exercises(&payload.exercises)
}

fn validate_routine_exercises(exercises: &[RoutineExercise]) -> AppResult<()> {
    for item in exercises {
        require_text("exercise_id", &item.exercise_id)?;
        ensure_non_negative_int("sets", item.sets)?;
        ensure_non_negative_int("reps", item.reps)?;
        ensure_non_negative("duration", item.duration)?;
        ensure_non_negative_int("rest_time", item.rest_time)?;
    }
    Ok(())
}

fn rows_to_routines(rows: Vec<RoutineRow>) -> AppResult<Vec<Routine>> {
    rows.into_iter()
        .map(|row| Routine::try_from(row).map_err(AppError::from))
        .collect()
}

pub struct Routines;

#[async_trait]
impl CrudService for Routines {
    type Record = Routine;
    type Payload = RoutinePayload;
    type Filter = RoutineFilter;
    type Key = String;

    const RESOURCE: &'static str = "Rotina";

    async fn list(db_pool: &SqlitePool, filter: RoutineFilter) -> AppResult<Vec<Routine>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ROUTINE_SELECT);
        qb.push(" WHERE 1 = 1");
        and_eq(&mut qb, "user_id", filter.user_id);
        and_eq(&mut qb, "is_pre_designed", filter.is_template);
        and_eq(&mut qb, "created_by", filter.created_by);
        qb.push(" ORDER BY created_at DESC");
        let rows = qb.build_query_as::<RoutineRow>().fetch_all(db_pool).await?;
        rows_to_routines(rows)
    }

    async fn find(db_pool: &SqlitePool, id: &String) -> AppResult<Option<Routine>> {
        let row = sqlx::query_as::<_, RoutineRow>(&format!("{ROUTINE_SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(db_pool)
            .await?;
        Ok(row.map(Routine::try_from).transpose()?)
    }

    async fn create(db_pool: &SqlitePool, payload: RoutinePayload) -> AppResult<Routine> {
        validate_routine(&payload)?;
        let id = new_id();
        let exercises = serde_json::to_string(&payload.exercises)?;
        sqlx::query(
            r#"
            INSERT INTO routines (id, name, description, user_id, exercises, is_pre_designed,
                                  created_by, base_routine_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(payload.name.trim())
        .bind(&payload.description)
        .bind(&payload.user_id)
        .bind(exercises)
        .bind(payload.is_pre_designed)
        .bind(&payload.created_by)
        .bind(&payload.base_routine_id)
        .bind(Utc::now())
        .execute(db_pool)
        .await?;
        tracing::info!(
            "✅ Rotina '{}' criada (pré-desenhada: {}).",
            payload.name,
            payload.is_pre_designed
        );
        Self::find(db_pool, &id)
            .await?
            .ok_or(AppError::InternalServerError)
    }

    async fn update(db_pool: &SqlitePool, id: &String, payload: RoutinePayload) -> AppResult<Routine> {
        validate_routine(&payload)?;
        let exercises = serde_json::to_string(&payload.exercises)?;
        let rows = sqlx::query(
            r#"
            UPDATE routines
            SET name = ?1, description = ?2, user_id = ?3, exercises = ?4,
                is_pre_designed = ?5, created_by = ?6, base_routine_id = ?7
            WHERE id = ?8
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.description)
        .bind(&payload.user_id)
        .bind(exercises)
        .bind(payload.is_pre_designed)
        .bind(&payload.created_by)
        .bind(&payload.base_routine_id)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)?;
        Self::find(db_pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(Self::RESOURCE.into()))
    }

    async fn delete(db_pool: &SqlitePool, id: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM routines WHERE id = ?1")
            .bind(id)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)
    }
}

/// Copia uma rotina pré-desenhada para `user_id`.
///
/// A cópia é independente: novo id, `is_pre_designed = false`,
/// `base_routine_id` aponta para a origem e a lista de exercícios é
/// copiada por valor, pelo que editar a origem depois não altera a cópia.
pub async fn adopt_routine(
    db_pool: &SqlitePool,
    source_id: &str,
    user_id: &str,
) -> AppResult<Routine> {
    require_text("user_id", user_id)?;
    let source = Routines::find(db_pool, &source_id.to_string())
        .await?
        .ok_or_else(|| AppError::NotFound(Routines::RESOURCE.into()))?;

    if !source.is_pre_designed {
        tracing::warn!("Adoção recusada: rotina {} não é pré-desenhada.", source_id);
        return Err(AppError::Validation(
            "Só é possível adotar rotinas pré-desenhadas.".into(),
        ));
    }

    tracing::info!("Utilizador {} adotando a rotina {}", user_id, source_id);
    Routines::create(
        db_pool,
        RoutinePayload {
            name: source.name,
            description: source.description,
            user_id: Some(user_id.to_string()),
            exercises: source.exercises,
            is_pre_designed: false,
            created_by: user_id.to_string(),
            base_routine_id: Some(source.id),
        },
    )
    .await
}

// --- Progresso ---

const PROGRESS_SELECT: &str = "SELECT id, user_id, routine_id, exercise_id, date, sets, reps, \
     duration, effort_level, notes FROM progress_logs";

fn validate_progress(payload: &ProgressPayload) -> AppResult<()> {
    require_text("user_id", &payload.user_id)?;
    if !(MIN_EFFORT_LEVEL..=MAX_EFFORT_LEVEL).contains(&payload.effort_level) {
        return Err(AppError::Validation(format!(
            "O nível de esforço deve estar entre {} e {}.",
            MIN_EFFORT_LEVEL, MAX_EFFORT_LEVEL
        )));
    }
    ensure_non_negative_int("sets", payload.sets)?;
    ensure_non_negative_int("reps", payload.reps)?;
    ensure_non_negative("duration", payload.duration)
}

pub struct Progress;

#[async_trait]
impl CrudService for Progress {
    type Record = ProgressLog;
    type Payload = ProgressPayload;
    type Filter = ProgressFilter;
    type Key = String;

    const RESOURCE: &'static str = "Registo de progresso";

    async fn list(db_pool: &SqlitePool, filter: ProgressFilter) -> AppResult<Vec<ProgressLog>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(PROGRESS_SELECT);
        qb.push(" WHERE 1 = 1");
        and_eq(&mut qb, "user_id", filter.user_id);
        and_eq(&mut qb, "routine_id", filter.routine_id);
        and_eq(&mut qb, "exercise_id", filter.exercise_id);
        qb.push(" ORDER BY date DESC");
        Ok(qb.build_query_as::<ProgressLog>().fetch_all(db_pool).await?)
    }

    async fn find(db_pool: &SqlitePool, id: &String) -> AppResult<Option<ProgressLog>> {
        Ok(
            sqlx::query_as::<_, ProgressLog>(&format!("{PROGRESS_SELECT} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(db_pool)
                .await?,
        )
    }

    async fn create(db_pool: &SqlitePool, payload: ProgressPayload) -> AppResult<ProgressLog> {
        validate_progress(&payload)?;
        let id = new_id();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO progress_logs (id, user_id, routine_id, exercise_id, date, sets, reps,
                                       duration, effort_level, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&id)
        .bind(&payload.user_id)
        .bind(&payload.routine_id)
        .bind(&payload.exercise_id)
        .bind(payload.date.unwrap_or(now))
        .bind(payload.sets)
        .bind(payload.reps)
        .bind(payload.duration)
        .bind(payload.effort_level)
        .bind(&payload.notes)
        .bind(now)
        .execute(db_pool)
        .await?;
        tracing::info!("✅ Progresso registado para {}.", payload.user_id);
        Self::find(db_pool, &id)
            .await?
            .ok_or(AppError::InternalServerError)
    }

    async fn update(
        db_pool: &SqlitePool,
        id: &String,
        payload: ProgressPayload,
    ) -> AppResult<ProgressLog> {
        validate_progress(&payload)?;
        let rows = sqlx::query(
            r#"
            UPDATE progress_logs
            SET user_id = ?1, routine_id = ?2, exercise_id = ?3, date = COALESCE(?4, date),
                sets = ?5, reps = ?6, duration = ?7, effort_level = ?8, notes = ?9
            WHERE id = ?10
            "#,
        )
        .bind(&payload.user_id)
        .bind(&payload.routine_id)
        .bind(&payload.exercise_id)
        .bind(payload.date)
        .bind(payload.sets)
        .bind(payload.reps)
        .bind(payload.duration)
        .bind(payload.effort_level)
        .bind(&payload.notes)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)?;
        Self::find(db_pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(Self::RESOURCE.into()))
    }

    async fn delete(db_pool: &SqlitePool, id: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM progress_logs WHERE id = ?1")
            .bind(id)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)
    }
}

/// Exercícios mais registados pelo utilizador; registos sem exercício
/// contam como "Desconocido".
pub const TOP_EXERCISES: i64 = 5;

pub async fn progress_summary(
    db_pool: &SqlitePool,
    user_id: &str,
) -> AppResult<ProgressSummary> {
    progress_summary_at(db_pool, user_id, Utc::now()).await
}

pub async fn progress_summary_at(
    db_pool: &SqlitePool,
    user_id: &str,
    now: DateTime<Utc>,
) -> AppResult<ProgressSummary> {
    let logs = Progress::list(
        db_pool,
        ProgressFilter {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        },
    )
    .await?;
    let top = sqlx::query_as::<_, ExerciseFrequency>(
        r#"
        SELECT COALESCE(e.name, 'Desconocido') AS name, COUNT(*) AS count
        FROM progress_logs p
        LEFT JOIN exercises e ON e.id = p.exercise_id
        WHERE p.user_id = ?1
        GROUP BY COALESCE(e.name, 'Desconocido')
        ORDER BY count DESC, name ASC
        LIMIT ?2
        "#,
    )
    .bind(user_id)
    .bind(TOP_EXERCISES)
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Resumo de progresso de {}: {} registos.", user_id, logs.len());
    Ok(ProgressSummary::from_logs(&logs, now, top))
}

// --- Recomendações ---

const RECOMMENDATION_SELECT: &str = "SELECT id, trainer_id, user_id, routine_id, progress_id, \
     message, date FROM recommendations";

fn validate_recommendation(payload: &RecommendationPayload) -> AppResult<()> {
    require_text("trainer_id", &payload.trainer_id)?;
    require_text("user_id", &payload.user_id)?;
    require_text("message", &payload.message)
}

pub struct Recommendations;

#[async_trait]
impl CrudService for Recommendations {
    type Record = TrainerRecommendation;
    type Payload = RecommendationPayload;
    type Filter = TrainerFilter;
    type Key = String;

    const RESOURCE: &'static str = "Recomendação";

    async fn list(
        db_pool: &SqlitePool,
        filter: TrainerFilter,
    ) -> AppResult<Vec<TrainerRecommendation>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(RECOMMENDATION_SELECT);
        qb.push(" WHERE 1 = 1");
        and_eq(&mut qb, "user_id", filter.user_id);
        and_eq(&mut qb, "trainer_id", filter.trainer_id);
        qb.push(" ORDER BY date DESC");
        Ok(qb
            .build_query_as::<TrainerRecommendation>()
            .fetch_all(db_pool)
            .await?)
    }

    async fn find(db_pool: &SqlitePool, id: &String) -> AppResult<Option<TrainerRecommendation>> {
        Ok(sqlx::query_as::<_, TrainerRecommendation>(&format!(
            "{RECOMMENDATION_SELECT} WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(db_pool)
        .await?)
    }

    async fn create(
        db_pool: &SqlitePool,
        payload: RecommendationPayload,
    ) -> AppResult<TrainerRecommendation> {
        validate_recommendation(&payload)?;
        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO recommendations (id, trainer_id, user_id, routine_id, progress_id,
                                         message, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(&payload.trainer_id)
        .bind(&payload.user_id)
        .bind(&payload.routine_id)
        .bind(&payload.progress_id)
        .bind(payload.message.trim())
        .bind(Utc::now())
        .execute(db_pool)
        .await?;
        tracing::info!(
            "✅ Recomendação de {} para {} enviada.",
            payload.trainer_id,
            payload.user_id
        );
        Self::find(db_pool, &id)
            .await?
            .ok_or(AppError::InternalServerError)
    }

    async fn update(
        db_pool: &SqlitePool,
        id: &String,
        payload: RecommendationPayload,
    ) -> AppResult<TrainerRecommendation> {
        validate_recommendation(&payload)?;
        let rows = sqlx::query(
            r#"
            UPDATE recommendations
            SET trainer_id = ?1, user_id = ?2, routine_id = ?3, progress_id = ?4, message = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&payload.trainer_id)
        .bind(&payload.user_id)
        .bind(&payload.routine_id)
        .bind(&payload.progress_id)
        .bind(payload.message.trim())
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)?;
        Self::find(db_pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(Self::RESOURCE.into()))
    }

    async fn delete(db_pool: &SqlitePool, id: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM recommendations WHERE id = ?1")
            .bind(id)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)
    }
}

// --- Seguimentos ---

const FOLLOWUP_SELECT: &str =
    "SELECT id, trainer_id, user_id, progress_id, comment, created_at FROM followups";

pub struct FollowUps;

#[async_trait]
impl CrudService for FollowUps {
    type Record = FollowUp;
    type Payload = FollowUpPayload;
    type Filter = TrainerFilter;
    type Key = String;

    const RESOURCE: &'static str = "Seguimento";

    async fn list(db_pool: &SqlitePool, filter: TrainerFilter) -> AppResult<Vec<FollowUp>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(FOLLOWUP_SELECT);
        qb.push(" WHERE 1 = 1");
        and_eq(&mut qb, "user_id", filter.user_id);
        and_eq(&mut qb, "trainer_id", filter.trainer_id);
        qb.push(" ORDER BY created_at DESC");
        Ok(qb.build_query_as::<FollowUp>().fetch_all(db_pool).await?)
    }

    async fn find(db_pool: &SqlitePool, id: &String) -> AppResult<Option<FollowUp>> {
        Ok(
            sqlx::query_as::<_, FollowUp>(&format!("{FOLLOWUP_SELECT} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(db_pool)
                .await?,
        )
    }

    async fn create(db_pool: &SqlitePool, payload: FollowUpPayload) -> AppResult<FollowUp> {
        require_text("trainer_id", &payload.trainer_id)?;
        require_text("user_id", &payload.user_id)?;
        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO followups (id, trainer_id, user_id, progress_id, comment, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&payload.trainer_id)
        .bind(&payload.user_id)
        .bind(&payload.progress_id)
        .bind(&payload.comment)
        .bind(Utc::now())
        .execute(db_pool)
        .await?;
        tracing::info!("✅ Seguimento de {} para {} registado.", payload.trainer_id, payload.user_id);
        Self::find(db_pool, &id)
            .await?
            .ok_or(AppError::InternalServerError)
    }

    async fn update(
        db_pool: &SqlitePool,
        id: &String,
        payload: FollowUpPayload,
    ) -> AppResult<FollowUp> {
        require_text("trainer_id", &payload.trainer_id)?;
        require_text("user_id", &payload.user_id)?;
        let rows = sqlx::query(
            "UPDATE followups SET trainer_id = ?1, user_id = ?2, progress_id = ?3, comment = ?4 \
             WHERE id = ?5",
        )
        .bind(&payload.trainer_id)
        .bind(&payload.user_id)
        .bind(&payload.progress_id)
        .bind(&payload.comment)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)?;
        Self::find(db_pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(Self::RESOURCE.into()))
    }

    async fn delete(db_pool: &SqlitePool, id: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM followups WHERE id = ?1")
            .bind(id)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)
    }
}

/// Exercícios da biblioteca base mais os criados por `author`.
pub async fn exercises_visible_to(db_pool: &SqlitePool, author: &str) -> AppResult<Vec<Exercise>> {
    Ok(sqlx::query_as::<_, Exercise>(&format!(
        "{EXERCISE_SELECT} WHERE created_by = ?1 OR created_by = ?2 ORDER BY name ASC"
    ))
    .bind(SYSTEM_AUTHOR)
    .bind(author)
    .fetch_all(db_pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::fitness::ExerciseKind};

    fn routine_payload(is_pre_designed: bool) -> RoutinePayload {
        RoutinePayload {
            name: "Full body".into(),
            description: "Rutina base".into(),
            user_id: None,
            exercises: vec![RoutineExercise {
                exercise_id: "e1".into(),
                sets: Some(3),
                reps: Some(12),
                duration: None,
                rest_time: Some(60),
                notes: None,
            }],
            is_pre_designed,
            created_by: "carlos".into(),
            base_routine_id: None,
        }
    }

    fn exercise_payload(name: &str, kind: ExerciseKind, created_by: &str) -> ExercisePayload {
        ExercisePayload {
            name: name.into(),
            kind,
            description: String::new(),
            duration: Some(20.0),
            difficulty: None,
            video_url: None,
            created_by: created_by.into(),
        }
    }

    #[tokio::test]
    async fn adopted_copy_is_independent_of_source() {
        let pool = db::memory_pool().await;
        let source = Routines::create(&pool, routine_payload(true)).await.unwrap();

        let copy = adopt_routine(&pool, &source.id, "juan").await.unwrap();
        assert_ne!(copy.id, source.id);
        assert!(!copy.is_pre_designed);
        assert_eq!(copy.base_routine_id.as_deref(), Some(source.id.as_str()));
        assert_eq!(copy.user_id.as_deref(), Some("juan"));
        assert_eq!(copy.created_by, "juan");
        assert_eq!(copy.exercises, source.exercises);

        let mut edited = routine_payload(true);
        edited.exercises[0].sets = Some(5);
        Routines::update(&pool, &source.id, edited).await.unwrap();

        let copy = Routines::find(&pool, &copy.id).await.unwrap().unwrap();
        assert_eq!(copy.exercises[0].sets, Some(3));
    }

    #[tokio::test]
    async fn only_pre_designed_routines_can_be_adopted() {
        let pool = db::memory_pool().await;
        let own = Routines::create(&pool, routine_payload(false)).await.unwrap();
        assert!(matches!(
            adopt_routine(&pool, &own.id, "juan").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            adopt_routine(&pool, "nao-existe", "juan").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn exercises_filter_by_type_and_flag_custom() {
        let pool = db::memory_pool().await;
        Exercises::create(&pool, exercise_payload("Trote", ExerciseKind::Cardio, SYSTEM_AUTHOR))
            .await
            .unwrap();
        Exercises::create(&pool, exercise_payload("Plancha", ExerciseKind::Fuerza, "juan"))
            .await
            .unwrap();

        let cardio = Exercises::list(
            &pool,
            ExerciseFilter {
                kind: Some(ExerciseKind::Cardio),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cardio.len(), 1);
        assert_eq!(cardio[0].name, "Trote");
        assert!(!cardio[0].is_custom);

        let mine = exercises_visible_to(&pool, "juan").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().any(|e| e.name == "Plancha" && e.is_custom));
        assert!(exercises_visible_to(&pool, "ana").await.unwrap().len() == 1);
    }

    #[tokio::test]
    async fn progress_rejects_effort_out_of_range() {
        let pool = db::memory_pool().await;
        let mut payload = ProgressPayload {
            user_id: "juan".into(),
            routine_id: None,
            exercise_id: None,
            date: None,
            sets: Some(3),
            reps: None,
            duration: None,
            effort_level: 11,
            notes: None,
        };
        assert!(matches!(
            Progress::create(&pool, payload.clone()).await,
            Err(AppError::Validation(_))
        ));

        payload.effort_level = 7;
        payload.sets = Some(-1);
        assert!(matches!(
            Progress::create(&pool, payload.clone()).await,
            Err(AppError::Validation(_))
        ));

        payload.sets = Some(3);
        let log = Progress::create(&pool, payload).await.unwrap();
        assert_eq!(log.effort_level, 7);
        assert_eq!(log.reps, None);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let pool = db::memory_pool().await;
        let id = "nao-existe".to_string();
        assert!(matches!(
            Routines::delete(&pool, &id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(Exercises::find(&pool, &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn summary_ranks_exercises_per_user() {
        let pool = db::memory_pool().await;
        let now = Utc::now();
        let trote = Exercises::create(
            &pool,
            exercise_payload("Trote", ExerciseKind::Cardio, "juan.perez"),
        )
        .await
        .unwrap();

        let entry = |user: &str, exercise: Option<&str>, days_ago: i64, effort: i64| {
            ProgressPayload {
                user_id: user.into(),
                routine_id: None,
                exercise_id: exercise.map(str::to_string),
                date: Some(now - chrono::Duration::days(days_ago)),
                sets: None,
                reps: None,
                duration: Some(10.0),
                effort_level: effort,
                notes: None,
            }
        };
        for payload in [
            entry("juan.perez", Some(trote.id.as_str()), 2, 6),
            entry("juan.perez", Some(trote.id.as_str()), 12, 8),
            entry("juan.perez", None, 0, 4),
            entry("otra.persona", Some(trote.id.as_str()), 1, 9),
        ] {
            Progress::create(&pool, payload).await.unwrap();
        }

        let summary = progress_summary_at(&pool, "juan.perez", now).await.unwrap();
        assert_eq!(summary.total_workouts, 3);
        assert_eq!(summary.workouts_this_week, 2);
        assert_eq!(summary.avg_effort, Some(6.0));
        assert_eq!(summary.total_duration, 30.0);
        assert_eq!(
            summary.top_exercises,
            vec![
                ExerciseFrequency {
                    name: "Trote".into(),
                    count: 2
                },
                ExerciseFrequency {
                    name: "Desconocido".into(),
                    count: 1
                },
            ]
        );

        let empty = progress_summary(&pool, "sem.registos").await.unwrap();
        assert_eq!(empty, ProgressSummary::default());
    }
}
