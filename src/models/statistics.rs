// src/models/statistics.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Atividade mensal de um estudante/funcionário.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserStatistics {
    pub user_id: String,
    /// YYYY-MM
    pub month: String,
    pub routines_started: i64,
    pub progress_logs: i64,
}

/// Atividade mensal de um treinador.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct InstructorStatistics {
    pub instructor_id: String,
    /// YYYY-MM
    pub month: String,
    pub new_assignments: i64,
    pub follow_ups: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
}
