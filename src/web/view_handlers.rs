// src/web/view_handlers.rs
use crate::{
    error::{AppError, AppResult, HtmlError},
    models::{
        accounts::{Role, User},
        fitness::{
            Difficulty, Exercise, ExerciseFilter, ExerciseKind, ExercisePayload, ProgressFilter,
            ProgressLog, ProgressPayload, ProgressSummary, RecommendationPayload, Routine, RoutineExercise,
            RoutineFilter, RoutinePayload, TrainerFilter,
        },
        statistics::StatisticsFilter,
    },
    services::{
        account_service,
        crud::{CrudService, NoFilter},
        fitness_service::{self, Exercises, FollowUps, Progress, Recommendations, Routines},
        hr_service::{ContractTypes, EmployeeTypes},
        location_service::Countries,
        statistics_service,
    },
    state::AppState,
    templates::{
        AccountRow, AdminDashboardPage, AssignmentRow, AssignmentsPage, Choice, ExerciseRow,
        ExercisesPage, InstructorDashboardPage, InstructorUsersPage, PreDesignedPage,
        ProgressRow, RecommendationRow, RoutineCard, SettingsPage, Shell, StatisticsPage,
        SummaryPanel,
        TraineeCard, TraineeDashboardPage, TraineeProgressPage, TraineeRoutinesPage,
    },
    views::{resolve_tab, view_for, Tab, View},
    web::mw_auth::CurrentUser,
};
use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, Redirect},
    Extension,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

type PageResult = Result<Html<String>, HtmlError>;

const RECENT_LOGS_PER_TRAINEE: usize = 3;

// --- Formatação ---

fn format_minutes(minutes: Option<f64>) -> String {
    match minutes {
        Some(m) if m.fract() == 0.0 => format!("{:.0} min", m),
        Some(m) => format!("{:.1} min", m),
        None => "-".to_string(),
    }
}

fn difficulty_label(difficulty: Option<Difficulty>) -> String {
    match difficulty {
        Some(Difficulty::Principiante) => "Principiante".into(),
        Some(Difficulty::Intermedio) => "Intermedio".into(),
        Some(Difficulty::Avanzado) => "Avanzado".into(),
        None => "-".into(),
    }
}

fn exercise_names(exercises: &[Exercise]) -> HashMap<String, String> {
    exercises
        .iter()
        .map(|e| (e.id.clone(), e.name.clone()))
        .collect()
}

fn routine_line(item: &RoutineExercise, names: &HashMap<String, String>) -> String {
    let name = names
        .get(&item.exercise_id)
        .cloned()
        .unwrap_or_else(|| item.exercise_id.clone());
    let mut parts = vec![name];
    match (item.sets, item.reps) {
        (Some(sets), Some(reps)) => parts.push(format!("{sets} x {reps}")),
        (Some(sets), None) => parts.push(format!("{sets} series")),
        (None, Some(reps)) => parts.push(format!("{reps} rep.")),
        (None, None) => {}
    }
    if item.duration.is_some() {
        parts.push(format_minutes(item.duration));
    }
    if let Some(rest) = item.rest_time {
        parts.push(format!("descanso {rest} s"));
    }
    parts.join(" · ")
}

fn routine_card(
    routine: &Routine,
    names: &HashMap<String, String>,
    routine_names: &HashMap<String, String>,
) -> RoutineCard {
    RoutineCard {
        id: routine.id.clone(),
        name: routine.name.clone(),
        description: routine.description.clone(),
        author: routine.created_by.clone(),
        adopted_from: routine.base_routine_id.as_ref().map(|id| {
            routine_names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.clone())
        }),
        lines: routine
            .exercises
            .iter()
            .map(|item| routine_line(item, names))
            .collect(),
    }
}

fn progress_row(
    log: &ProgressLog,
    names: &HashMap<String, String>,
    routine_names: &HashMap<String, String>,
) -> ProgressRow {
    let lookup = |map: &HashMap<String, String>, id: &Option<String>| {
        id.as_ref()
            .map(|id| map.get(id).cloned().unwrap_or_else(|| id.clone()))
            .unwrap_or_else(|| "-".to_string())
    };
    let mut detail = Vec::new();
    if let Some(sets) = log.sets {
        detail.push(format!("{sets} series"));
    }
    if let Some(reps) = log.reps {
        detail.push(format!("{reps} rep."));
    }
    if log.duration.is_some() {
        detail.push(format_minutes(log.duration));
    }
    ProgressRow {
        date: log.date.format("%Y-%m-%d %H:%M").to_string(),
        routine: lookup(routine_names, &log.routine_id),
        exercise: lookup(names, &log.exercise_id),
        detail: if detail.is_empty() {
            "-".to_string()
        } else {
            detail.join(", ")
        },
        effort: log.effort_level,
        notes: log.notes.clone().unwrap_or_default(),
    }
}

fn summary_panel(summary: &ProgressSummary) -> SummaryPanel {
    SummaryPanel {
        this_week: summary.workouts_this_week,
        total: summary.total_workouts,
        avg_effort: summary
            .avg_effort
            .map(|avg| format!("{:.1}", avg))
            .unwrap_or_else(|| "0".to_string()),
        total_minutes: format_minutes(Some(summary.total_duration)),
        last_workout: summary
            .last_workout
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string()),
        top_exercises: summary
            .top_exercises
            .iter()
            .map(|f| (f.name.clone(), f.count))
            .collect(),
    }
}

fn exercise_choices(exercises: &[Exercise]) -> Vec<Choice> {
    exercises
        .iter()
        .map(|e| Choice {
            value: e.id.clone(),
            label: e.name.clone(),
            selected: false,
        })
        .collect()
}

fn routine_choices(routines: &[Routine]) -> Vec<Choice> {
    routines
        .iter()
        .map(|r| Choice {
            value: r.id.clone(),
            label: r.name.clone(),
            selected: false,
        })
        .collect()
}

async fn all_routine_names(db_pool: &SqlitePool) -> AppResult<HashMap<String, String>> {
    Ok(Routines::list(db_pool, RoutineFilter::default())
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect())
}

/// Campo numérico de formulário: vazio = ausente.
fn parse_optional<T: std::str::FromStr>(field: &str, raw: &str) -> AppResult<Option<T>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("Valor inválido para '{}'.", field)))
}

/// Como `parse_optional`, mas recusa `inf` e `NaN`.
fn parse_finite(field: &str, raw: &str) -> AppResult<Option<f64>> {
    match parse_optional::<f64>(field, raw)? {
        Some(value) if !value.is_finite() => Err(AppError::Validation(format!(
            "Valor inválido para '{}'.",
            field
        ))),
        value => Ok(value),
    }
}

fn non_empty(raw: &str) -> Option<String> {
    Some(raw.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn require_role(user: &CurrentUser, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::warn!(
            "Ação recusada para {} (papel {}).",
            user.username,
            user.role.as_str()
        );
        Err(AppError::Unauthorized)
    }
}

// --- Navegação ---

// GET /
pub async fn root() -> Redirect {
    Redirect::to("/app")
}

// GET /app
pub async fn show_home(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(filter): Query<StatisticsFilter>,
) -> PageResult {
    render_tab(&state.db_pool, &current, None, filter).await
}

// GET /app/{tab}
pub async fn show_tab(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(tab): Path<String>,
    Query(filter): Query<StatisticsFilter>,
) -> PageResult {
    render_tab(&state.db_pool, &current, Some(&tab), filter).await
}

async fn render_tab(
    db_pool: &SqlitePool,
    current: &CurrentUser,
    requested: Option<&str>,
    filter: StatisticsFilter,
) -> PageResult {
    let user = account_service::find_user(db_pool, &current.username)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    let tab = resolve_tab(user.role, requested);
    let shell = Shell::new(&user, tab);
    tracing::debug!("Página {:?} para {}", tab, user.id);

    let html = match view_for(user.role, tab) {
        View::TraineeDashboard => trainee_dashboard(db_pool, &user, shell).await?,
        View::TraineeRoutines => trainee_routines(db_pool, &user, shell).await?,
        View::TraineeExercises | View::InstructorExercises => {
            exercises_page(db_pool, &user, shell).await?
        }
        View::TraineeProgress => trainee_progress(db_pool, &user, shell).await?,
        View::InstructorDashboard => instructor_dashboard(db_pool, &user, shell).await?,
        View::InstructorUsers => instructor_users(db_pool, &user, shell).await?,
        View::InstructorPreDesigned => instructor_pre_designed(db_pool, &user, shell).await?,
        View::AdminDashboard => admin_dashboard(db_pool, shell).await?,
        View::AdminAssignments => admin_assignments(db_pool, shell).await?,
        View::AdminStatistics => admin_statistics(db_pool, shell, filter).await?,
        View::AdminSettings => admin_settings(db_pool, shell).await?,
    };
    Ok(Html(html))
}

// --- Estudante / funcionário ---

async fn trainee_dashboard(db_pool: &SqlitePool, user: &User, shell: Shell) -> AppResult<String> {
    let routines = Routines::list(
        db_pool,
        RoutineFilter {
            user_id: Some(user.id.clone()),
            ..Default::default()
        },
    )
    .await?;
    let month = statistics_service::current_month();
    let logs = Progress::list(
        db_pool,
        ProgressFilter {
            user_id: Some(user.id.clone()),
            ..Default::default()
        },
    )
    .await?;
    let logs_this_month = logs
        .iter()
        .filter(|log| log.date.format("%Y-%m").to_string() == month)
        .count();

    let trainer = match &user.assigned_trainer_id {
        Some(id) => account_service::find_user(db_pool, id)
            .await?
            .map(|t| t.full_name()),
        None => None,
    };

    let mut recommendations = Vec::new();
    for rec in Recommendations::list(
        db_pool,
        TrainerFilter {
            user_id: Some(user.id.clone()),
            ..Default::default()
        },
    )
    .await?
    {
        let from = account_service::find_user(db_pool, &rec.trainer_id)
            .await?
            .map(|t| t.full_name())
            .unwrap_or(rec.trainer_id);
        recommendations.push(RecommendationRow {
            from,
            date: rec.date.format("%Y-%m-%d").to_string(),
            message: rec.message,
        });
    }

    Ok(TraineeDashboardPage {
        shell,
        routines: routines.len(),
        logs_this_month,
        trainer,
        recommendations,
    }
    .render()?)
}

async fn trainee_routines(db_pool: &SqlitePool, user: &User, shell: Shell) -> AppResult<String> {
    let names = exercise_names(&Exercises::list(db_pool, ExerciseFilter::default()).await?);
    let routine_names = all_routine_names(db_pool).await?;
    let mine = Routines::list(
        db_pool,
        RoutineFilter {
            user_id: Some(user.id.clone()),
            ..Default::default()
        },
    )
    .await?;
    let templates = Routines::list(
        db_pool,
        RoutineFilter {
            is_template: Some(true),
            ..Default::default()
        },
    )
    .await?;

    Ok(TraineeRoutinesPage {
        shell,
        mine: mine
            .iter()
            .filter(|r| !r.is_pre_designed)
            .map(|r| routine_card(r, &names, &routine_names))
            .collect(),
        templates: templates
            .iter()
            .map(|r| routine_card(r, &names, &routine_names))
            .collect(),
    }
    .render()?)
}

async fn exercises_page(db_pool: &SqlitePool, user: &User, shell: Shell) -> AppResult<String> {
    let exercises = fitness_service::exercises_visible_to(db_pool, &user.id).await?;
    let rows = exercises
        .into_iter()
        .map(|e| ExerciseRow {
            kind: e.kind.label(),
            difficulty: difficulty_label(e.difficulty),
            duration: format_minutes(e.duration),
            custom: e.is_custom,
            name: e.name,
            description: e.description,
            video_url: e.video_url,
        })
        .collect();
    let kinds = ExerciseKind::ALL
        .into_iter()
        .map(|k| Choice {
            value: k.as_str().to_string(),
            label: k.label().to_string(),
            selected: false,
        })
        .collect();
    let difficulties = [
        Difficulty::Principiante,
        Difficulty::Intermedio,
        Difficulty::Avanzado,
    ]
    .into_iter()
    .map(|d| Choice {
        value: d.as_str().to_string(),
        label: difficulty_label(Some(d)),
        selected: false,
    })
    .collect();

    Ok(ExercisesPage {
        shell,
        exercises: rows,
        kinds,
        difficulties,
    }
    .render()?)
}

async fn trainee_progress(db_pool: &SqlitePool, user: &User, shell: Shell) -> AppResult<String> {
    let exercises = fitness_service::exercises_visible_to(db_pool, &user.id).await?;
    let names = exercise_names(&exercises);
    let routines = Routines::list(
        db_pool,
        RoutineFilter {
            user_id: Some(user.id.clone()),
            ..Default::default()
        },
    )
    .await?;
    let routine_names = all_routine_names(db_pool).await?;
    let logs = Progress::list(
        db_pool,
        ProgressFilter {
            user_id: Some(user.id.clone()),
            ..Default::default()
        },
    )
    .await?;

    let summary = fitness_service::progress_summary(db_pool, &user.id).await?;

    Ok(TraineeProgressPage {
        shell,
        summary: summary_panel(&summary),
        logs: logs
            .iter()
            .map(|log| progress_row(log, &names, &routine_names))
            .collect(),
        routines: routine_choices(&routines),
        exercises: exercise_choices(&exercises),
    }
    .render()?)
}

// --- Treinador ---

async fn instructor_dashboard(
    db_pool: &SqlitePool,
    user: &User,
    shell: Shell,
) -> AppResult<String> {
    let by_me = TrainerFilter {
        trainer_id: Some(user.id.clone()),
        ..Default::default()
    };
    Ok(InstructorDashboardPage {
        shell,
        assigned: account_service::list_assigned_users(db_pool, &user.id)
            .await?
            .len(),
        templates: Routines::list(
            db_pool,
            RoutineFilter {
                is_template: Some(true),
                created_by: Some(user.id.clone()),
                ..Default::default()
            },
        )
        .await?
        .len(),
        recommendations: Recommendations::list(db_pool, by_me.clone()).await?.len(),
        follow_ups: FollowUps::list(db_pool, by_me).await?.len(),
    }
    .render()?)
}

async fn instructor_users(db_pool: &SqlitePool, user: &User, shell: Shell) -> AppResult<String> {
    let names = exercise_names(&Exercises::list(db_pool, ExerciseFilter::default()).await?);
    let routine_names = all_routine_names(db_pool).await?;
    let templates = Routines::list(
        db_pool,
        RoutineFilter {
            is_template: Some(true),
            ..Default::default()
        },
    )
    .await?;

    let mut trainees = Vec::new();
    for trainee in account_service::list_assigned_users(db_pool, &user.id).await? {
        let logs = Progress::list(
            db_pool,
            ProgressFilter {
                user_id: Some(trainee.id.clone()),
                ..Default::default()
            },
        )
        .await?;
        let summary = fitness_service::progress_summary(db_pool, &trainee.id).await?;
        trainees.push(TraineeCard {
            name: trainee.full_name(),
            summary: summary_panel(&summary),
            recent: logs
                .iter()
                .take(RECENT_LOGS_PER_TRAINEE)
                .map(|log| progress_row(log, &names, &routine_names))
                .collect(),
            id: trainee.id,
            email: trainee.email,
        });
    }

    Ok(InstructorUsersPage {
        shell,
        trainees,
        routines: routine_choices(&templates),
    }
    .render()?)
}

async fn instructor_pre_designed(
    db_pool: &SqlitePool,
    user: &User,
    shell: Shell,
) -> AppResult<String> {
    let exercises = fitness_service::exercises_visible_to(db_pool, &user.id).await?;
    let names = exercise_names(&exercises);
    let routine_names = all_routine_names(db_pool).await?;
    let routines = Routines::list(
        db_pool,
        RoutineFilter {
            is_template: Some(true),
            created_by: Some(user.id.clone()),
            ..Default::default()
        },
    )
    .await?;

    Ok(PreDesignedPage {
        shell,
        routines: routines
            .iter()
            .map(|r| routine_card(r, &names, &routine_names))
            .collect(),
        exercises: exercise_choices(&exercises),
    }
    .render()?)
}

// --- Administrador ---

async fn admin_dashboard(db_pool: &SqlitePool, shell: Shell) -> AppResult<String> {
    let users = account_service::list_users(db_pool).await?;
    let count = |role: Role| users.iter().filter(|u| u.role == role).count();
    Ok(AdminDashboardPage {
        shell,
        students: count(Role::Student),
        employees: count(Role::Employee),
        instructors: count(Role::Instructor),
        admins: count(Role::Admin),
        exercises: Exercises::list(db_pool, ExerciseFilter::default())
            .await?
            .len(),
        templates: Routines::list(
            db_pool,
            RoutineFilter {
                is_template: Some(true),
                ..Default::default()
            },
        )
        .await?
        .len(),
    }
    .render()?)
}

async fn admin_assignments(db_pool: &SqlitePool, shell: Shell) -> AppResult<String> {
    let users = account_service::list_users(db_pool).await?;
    let trainers: Vec<&User> = users.iter().filter(|u| u.role == Role::Instructor).collect();
    let trainees = users
        .iter()
        .filter(|u| u.role.is_trainee())
        .map(|u| AssignmentRow {
            id: u.id.clone(),
            name: u.full_name(),
            role_label: u.role.label(),
            trainers: trainers
                .iter()
                .map(|t| Choice {
                    value: t.id.clone(),
                    label: t.full_name(),
                    selected: u.assigned_trainer_id.as_deref() == Some(t.id.as_str()),
                })
                .collect(),
        })
        .collect();
    Ok(AssignmentsPage { shell, trainees }.render()?)
}

async fn admin_statistics(
    db_pool: &SqlitePool,
    shell: Shell,
    filter: StatisticsFilter,
) -> AppResult<String> {
    let month = statistics_service::resolve_month(filter.month.as_deref())?;
    Ok(StatisticsPage {
        shell,
        users: statistics_service::user_statistics(db_pool, &month).await?,
        instructors: statistics_service::instructor_statistics(db_pool, &month).await?,
        month,
    }
    .render()?)
}

async fn admin_settings(db_pool: &SqlitePool, shell: Shell) -> AppResult<String> {
    let accounts = account_service::list_users(db_pool)
        .await?
        .into_iter()
        .map(|u| AccountRow {
            name: u.full_name(),
            role_label: u.role.label(),
            id: u.id,
            email: u.email,
        })
        .collect();
    Ok(SettingsPage {
        shell,
        accounts,
        contract_types: ContractTypes::list(db_pool, NoFilter {})
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect(),
        employee_types: EmployeeTypes::list(db_pool, NoFilter {})
            .await?
            .into_iter()
            .map(|e| e.name)
            .collect(),
        countries: Countries::list(db_pool, NoFilter {})
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect(),
    }
    .render()?)
}

// --- Ações ---

// POST /app/routines/{id}/adopt
pub async fn adopt_routine(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(routine_id): Path<String>,
) -> Result<Redirect, HtmlError> {
    require_role(&current, &[Role::Student, Role::Employee])?;
    fitness_service::adopt_routine(&state.db_pool, &routine_id, &current.username).await?;
    Ok(Redirect::to(&format!("/app/{}", Tab::Routines.slug())))
}

#[derive(Debug, Deserialize)]
pub struct ProgressForm {
    #[serde(default)]
    pub routine_id: String,
    #[serde(default)]
    pub exercise_id: String,
    #[serde(default)]
    pub sets: String,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub duration: String,
    pub effort_level: String,
    #[serde(default)]
    pub notes: String,
}

// POST /app/actions/progress
pub async fn log_progress(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<ProgressForm>,
) -> Result<Redirect, HtmlError> {
    require_role(&current, &[Role::Student, Role::Employee])?;
    let effort_level = parse_optional::<i64>("effort_level", &form.effort_level)?
        .ok_or_else(|| AppError::Validation("O nível de esforço é obrigatório.".into()))?;
    Progress::create(
        &state.db_pool,
        ProgressPayload {
            user_id: current.username.clone(),
            routine_id: non_empty(&form.routine_id),
            exercise_id: non_empty(&form.exercise_id),
            date: None,
            sets: parse_optional("sets", &form.sets)?,
            reps: parse_optional("reps", &form.reps)?,
            duration: parse_finite("duration", &form.duration)?,
            effort_level,
            notes: non_empty(&form.notes),
        },
    )
    .await?;
    Ok(Redirect::to(&format!("/app/{}", Tab::Progress.slug())))
}

#[derive(Debug, Deserialize)]
pub struct ExerciseForm {
    pub name: String,
    pub kind: ExerciseKind,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

// POST /app/actions/exercises
pub async fn create_exercise(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<ExerciseForm>,
) -> Result<Redirect, HtmlError> {
    require_role(
        &current,
        &[Role::Student, Role::Employee, Role::Instructor],
    )?;
    Exercises::create(
        &state.db_pool,
        ExercisePayload {
            name: form.name,
            kind: form.kind,
            description: form.description,
            duration: parse_finite("duration", &form.duration)?,
            difficulty: Some(form.difficulty),
            video_url: None,
            created_by: current.username.clone(),
        },
    )
    .await?;
    Ok(Redirect::to(&format!("/app/{}", Tab::Exercises.slug())))
}

#[derive(Debug, Deserialize)]
pub struct PreDesignedForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercise_1: String,
    #[serde(default)]
    pub exercise_2: String,
    #[serde(default)]
    pub exercise_3: String,
    #[serde(default)]
    pub sets: String,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub rest_time: String,
}

// POST /app/actions/pre-designed
pub async fn create_pre_designed(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<PreDesignedForm>,
) -> Result<Redirect, HtmlError> {
    require_role(&current, &[Role::Instructor])?;
    let sets = parse_optional("sets", &form.sets)?;
    let reps = parse_optional("reps", &form.reps)?;
    let rest_time = parse_optional("rest_time", &form.rest_time)?;
    let exercises: Vec<RoutineExercise> = [&form.exercise_1, &form.exercise_2, &form.exercise_3]
        .into_iter()
        .filter_map(|id| non_empty(id))
        .map(|exercise_id| RoutineExercise {
            exercise_id,
            sets,
            reps,
            duration: None,
            rest_time,
            notes: None,
        })
        .collect();
    if exercises.is_empty() {
        return Err(AppError::Validation("Escolha pelo menos um exercício.".into()).into());
    }

    Routines::create(
        &state.db_pool,
        RoutinePayload {
            name: form.name,
            description: form.description,
            user_id: None,
            exercises,
            is_pre_designed: true,
            created_by: current.username.clone(),
            base_routine_id: None,
        },
    )
    .await?;
    Ok(Redirect::to(&format!("/app/{}", Tab::PreDesigned.slug())))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationForm {
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub routine_id: String,
}

// POST /app/actions/recommendations
pub async fn send_recommendation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<RecommendationForm>,
) -> Result<Redirect, HtmlError> {
    require_role(&current, &[Role::Instructor])?;
    Recommendations::create(
        &state.db_pool,
        RecommendationPayload {
            trainer_id: current.username.clone(),
            user_id: form.user_id,
            routine_id: non_empty(&form.routine_id),
            progress_id: None,
            message: form.message,
        },
    )
    .await?;
    Ok(Redirect::to(&format!("/app/{}", Tab::MyUsers.slug())))
}

#[derive(Debug, Deserialize)]
pub struct AssignmentForm {
    pub username: String,
    #[serde(default)]
    pub trainer: String,
}

// POST /app/actions/assignments
pub async fn save_assignment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<AssignmentForm>,
) -> Result<Redirect, HtmlError> {
    require_role(&current, &[Role::Admin])?;
    let trainer = non_empty(&form.trainer);
    account_service::assign_trainer(&state.db_pool, &form.username, trainer.as_deref()).await?;
    Ok(Redirect::to(&format!("/app/{}", Tab::Assignments.slug())))
}
