// src/models/fitness.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Autor dos exercícios da biblioteca base.
pub const SYSTEM_AUTHOR: &str = "system";

pub const MIN_EFFORT_LEVEL: i64 = 1;
pub const MAX_EFFORT_LEVEL: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ExerciseKind {
    Cardio,
    Fuerza,
    Movilidad,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 3] = [
        ExerciseKind::Cardio,
        ExerciseKind::Fuerza,
        ExerciseKind::Movilidad,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::Cardio => "cardio",
            ExerciseKind::Fuerza => "fuerza",
            ExerciseKind::Movilidad => "movilidad",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExerciseKind::Cardio => "Cardio",
            ExerciseKind::Fuerza => "Fuerza",
            ExerciseKind::Movilidad => "Movilidad",
        }
    }
}

/// Nível de dificuldade. O backend antigo usava baja/media/alta,
/// ainda aceites à entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "baja")]
    Principiante,
    #[serde(alias = "media")]
    Intermedio,
    #[serde(alias = "alta")]
    Avanzado,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Principiante => "principiante",
            Difficulty::Intermedio => "intermedio",
            Difficulty::Avanzado => "avanzado",
        }
    }
}

// --- Exercícios ---

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: ExerciseKind,
    #[serde(default)]
    pub description: String,
    /// Minutos
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default = "default_author")]
    pub created_by: String,
    /// Calculado na query: `created_by != 'system'`
    #[serde(default)]
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
}

fn default_author() -> String {
    SYSTEM_AUTHOR.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default = "default_author")]
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ExerciseKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

// --- Rotinas ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub exercise_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<i64>,
    /// Minutos
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Segundos
    #[serde(default, alias = "rest", skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub exercises: Vec<RoutineExercise>,
    #[serde(default, alias = "is_template")]
    pub is_pre_designed: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "adopted_from")]
    pub base_routine_id: Option<String>,
}

/// Linha da tabela `routines`; os exercícios vêm em JSON.
#[derive(Debug, Clone, FromRow)]
pub struct RoutineRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub user_id: Option<String>,
    pub exercises: String,
    pub is_pre_designed: bool,
    pub created_by: String,
    pub base_routine_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RoutineRow> for Routine {
    type Error = serde_json::Error;

    fn try_from(row: RoutineRow) -> Result<Self, Self::Error> {
        Ok(Routine {
            exercises: serde_json::from_str(&row.exercises)?,
            id: row.id,
            name: row.name,
            description: row.description,
            user_id: row.user_id,
            is_pre_designed: row.is_pre_designed,
            created_by: row.created_by,
            created_at: row.created_at,
            base_routine_id: row.base_routine_id,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutinePayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub exercises: Vec<RoutineExercise>,
    #[serde(default, alias = "is_template")]
    pub is_pre_designed: bool,
    pub created_by: String,
    #[serde(default, alias = "adopted_from")]
    pub base_routine_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptRequest {
    pub user_id: String,
}

// --- Progresso ---

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProgressLog {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub routine_id: Option<String>,
    #[serde(default)]
    pub exercise_id: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub sets: Option<i64>,
    #[serde(default, alias = "repetitions")]
    pub reps: Option<i64>,
    #[serde(default)]
    pub duration: Option<f64>,
    pub effort_level: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub user_id: String,
    #[serde(default)]
    pub routine_id: Option<String>,
    #[serde(default)]
    pub exercise_id: Option<String>,
    /// Ausente = agora
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sets: Option<i64>,
    #[serde(default, alias = "repetitions")]
    pub reps: Option<i64>,
    #[serde(default)]
    pub duration: Option<f64>,
    pub effort_level: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
}

/// Quantas vezes um exercício aparece nos registos de um utilizador.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ExerciseFrequency {
    pub name: String,
    pub count: i64,
}

/// Resumo do progresso de um utilizador.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_workouts: i64,
    /// Registos dos últimos 7 dias
    pub workouts_this_week: i64,
    pub avg_effort: Option<f64>,
    /// Minutos
    pub total_duration: f64,
    pub last_workout: Option<DateTime<Utc>>,
    pub top_exercises: Vec<ExerciseFrequency>,
}

impl ProgressSummary {
    pub fn from_logs(
        logs: &[ProgressLog],
        now: DateTime<Utc>,
        top_exercises: Vec<ExerciseFrequency>,
    ) -> Self {
        let week_start = now - chrono::Duration::days(7);
        let total_workouts = logs.len() as i64;
        let avg_effort = (!logs.is_empty()).then(|| {
            logs.iter().map(|l| l.effort_level as f64).sum::<f64>() / logs.len() as f64
        });
        Self {
            total_workouts,
            workouts_this_week: logs.iter().filter(|l| l.date >= week_start).count() as i64,
            avg_effort,
            total_duration: logs.iter().filter_map(|l| l.duration).sum(),
            last_workout: logs.iter().map(|l| l.date).max(),
            top_exercises,
        }
    }
}

// --- Recomendações e seguimentos ---

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct TrainerRecommendation {
    pub id: String,
    pub trainer_id: String,
    pub user_id: String,
    #[serde(default, alias = "related_routine_id")]
    pub routine_id: Option<String>,
    #[serde(default, alias = "related_progress_id")]
    pub progress_id: Option<String>,
    pub message: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationPayload {
    pub trainer_id: String,
    pub user_id: String,
    #[serde(default, alias = "related_routine_id")]
    pub routine_id: Option<String>,
    #[serde(default, alias = "related_progress_id")]
    pub progress_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: String,
    pub trainer_id: String,
    pub user_id: String,
    #[serde(default)]
    pub progress_id: Option<String>,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpPayload {
    pub trainer_id: String,
    pub user_id: String,
    #[serde(default)]
    pub progress_id: Option<String>,
    #[serde(default)]
    pub comment: String,
}

/// Filtro comum a recomendações e seguimentos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainerFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn log(
        days_ago: i64,
        effort_level: i64,
        duration: Option<f64>,
        now: DateTime<Utc>,
    ) -> ProgressLog {
        ProgressLog {
            id: format!("p{days_ago}"),
            user_id: "juan.perez".into(),
            routine_id: None,
            exercise_id: None,
            date: now - Duration::days(days_ago),
            sets: None,
            reps: None,
            duration,
            effort_level,
            notes: None,
        }
    }

    #[test]
    fn summary_counts_the_last_seven_days() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        let logs = vec![
            log(1, 8, Some(30.0), now),
            log(6, 6, None, now),
            log(10, 7, Some(15.5), now),
        ];
        let summary = ProgressSummary::from_logs(&logs, now, vec![]);
        assert_eq!(summary.total_workouts, 3);
        assert_eq!(summary.workouts_this_week, 2);
        assert_eq!(summary.avg_effort, Some(7.0));
        assert_eq!(summary.total_duration, 45.5);
        assert_eq!(summary.last_workout, Some(now - Duration::days(1)));
    }

    #[test]
    fn empty_summary_has_no_average() {
        let summary = ProgressSummary::from_logs(&[], Utc::now(), vec![]);
        assert_eq!(summary.total_workouts, 0);
        assert_eq!(summary.avg_effort, None);
        assert_eq!(summary.last_workout, None);
    }

    #[test]
    fn legacy_difficulty_names_are_accepted() {
        let payload: ExercisePayload = serde_json::from_value(json!({
            "name": "Sentadillas",
            "type": "fuerza",
            "difficulty": "media"
        }))
        .unwrap();
        assert_eq!(payload.difficulty, Some(Difficulty::Intermedio));
        assert_eq!(payload.created_by, SYSTEM_AUTHOR);
        assert_eq!(payload.duration, None);
    }

    #[test]
    fn routine_accepts_template_wire_names() {
        let routine: Routine = serde_json::from_value(json!({
            "id": "r2",
            "name": "Copia",
            "exercises": [{"exercise_id": "e1", "sets": 3, "rest": 60}],
            "is_template": false,
            "adopted_from": "r1",
            "created_by": "juan",
            "created_at": "2024-11-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(routine.base_routine_id.as_deref(), Some("r1"));
        assert_eq!(routine.exercises[0].rest_time, Some(60));
        assert_eq!(routine.exercises[0].reps, None);
    }

    #[test]
    fn empty_filters_serialize_to_nothing() {
        let value = serde_json::to_value(ExerciseFilter::default()).unwrap();
        assert_eq!(value, json!({}));
        let value = serde_json::to_value(ExerciseFilter {
            kind: Some(ExerciseKind::Cardio),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(value, json!({"type": "cardio"}));
    }
}
