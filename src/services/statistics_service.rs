// src/services/statistics_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        accounts::TRAINER_EMPLOYEE_TYPE,
        statistics::{InstructorStatistics, UserStatistics},
    },
};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

/// Mês corrente no formato `YYYY-MM`.
pub fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

/// Valida `YYYY-MM`; ausente = mês corrente.
pub fn resolve_month(month: Option<&str>) -> AppResult<String> {
    match month.map(str::trim).filter(|m| !m.is_empty()) {
        None => Ok(current_month()),
        Some(m) => {
            let valid = m.len() == 7
                && NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d").is_ok();
            if valid {
                Ok(m.to_string())
            } else {
                Err(AppError::Validation(format!(
                    "Mês inválido '{}': use o formato AAAA-MM.",
                    m
                )))
            }
        }
    }
}

/// Rotinas iniciadas e registos de progresso por estudante/funcionário no mês.
pub async fn user_statistics(db_pool: &SqlitePool, month: &str) -> AppResult<Vec<UserStatistics>> {
    tracing::debug!("Calculando estatísticas de utilizadores para {}", month);
    let stats = sqlx::query_as::<_, UserStatistics>(
        r#"
        SELECT u.username AS user_id,
               ?1 AS month,
               (SELECT COUNT(*) FROM routines r
                 WHERE r.user_id = u.username AND substr(r.created_at, 1, 7) = ?1) AS routines_started,
               (SELECT COUNT(*) FROM progress_logs p
                 WHERE p.user_id = u.username AND substr(p.date, 1, 7) = ?1) AS progress_logs
        FROM users u
        WHERE u.role IN ('STUDENT', 'EMPLOYEE')
          AND NOT EXISTS (SELECT 1 FROM employees e
                          WHERE e.id = u.employee AND e.employee_type = ?2)
        ORDER BY u.username ASC
        "#,
    )
    .bind(month)
    .bind(TRAINER_EMPLOYEE_TYPE)
    .fetch_all(db_pool)
    .await?;
    Ok(stats)
}

/// Novas atribuições e seguimentos por treinador no mês.
pub async fn instructor_statistics(
    db_pool: &SqlitePool,
    month: &str,
) -> AppResult<Vec<InstructorStatistics>> {
    tracing::debug!("Calculando estatísticas de treinadores para {}", month);
    let stats = sqlx::query_as::<_, InstructorStatistics>(
        r#"
        SELECT u.username AS instructor_id,
               ?1 AS month,
               (SELECT COUNT(*) FROM users a
                 WHERE a.assigned_trainer = u.username
                   AND substr(a.assigned_at, 1, 7) = ?1) AS new_assignments,
               (SELECT COUNT(*) FROM followups f
                 WHERE f.trainer_id = u.username AND substr(f.created_at, 1, 7) = ?1) AS follow_ups
        FROM users u
        JOIN employees e ON e.id = u.employee
        WHERE u.role = 'EMPLOYEE' AND e.employee_type = ?2
        ORDER BY u.username ASC
        "#,
    )
    .bind(month)
    .bind(TRAINER_EMPLOYEE_TYPE)
    .fetch_all(db_pool)
    .await?;
    Ok(stats)
}
