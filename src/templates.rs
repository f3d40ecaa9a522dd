// src/templates.rs
use crate::{
    models::{
        accounts::User,
        statistics::{InstructorStatistics, UserStatistics},
    },
    views::{tabs_for, Tab},
};
use askama::Template;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
    /// Email digitado, para não o perder quando o login falha
    pub email: String,
}

// --- Moldura comum (base.html) ---

pub struct NavItem {
    pub href: String,
    pub label: &'static str,
    pub active: bool,
}

pub struct Shell {
    pub user_name: String,
    pub initials: String,
    pub role_label: &'static str,
    pub nav: Vec<NavItem>,
}

impl Shell {
    pub fn new(user: &User, active: Tab) -> Self {
        Self {
            user_name: user.full_name(),
            initials: user.initials(),
            role_label: user.role.label(),
            nav: tabs_for(user.role)
                .iter()
                .map(|tab| NavItem {
                    href: format!("/app/{}", tab.slug()),
                    label: tab.label(),
                    active: *tab == active,
                })
                .collect(),
        }
    }
}

// --- Linhas já formatadas para as tabelas ---

pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct RoutineCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub adopted_from: Option<String>,
    pub lines: Vec<String>,
}

pub struct ExerciseRow {
    pub name: String,
    pub kind: &'static str,
    pub difficulty: String,
    pub duration: String,
    pub description: String,
    pub video_url: Option<String>,
    pub custom: bool,
}

pub struct ProgressRow {
    pub date: String,
    pub routine: String,
    pub exercise: String,
    pub detail: String,
    pub effort: i64,
    pub notes: String,
}

pub struct RecommendationRow {
    pub from: String,
    pub date: String,
    pub message: String,
}

/// Resumo de progresso já formatado.
pub struct SummaryPanel {
    pub this_week: i64,
    pub total: i64,
    pub avg_effort: String,
    pub total_minutes: String,
    pub last_workout: String,
    pub top_exercises: Vec<(String, i64)>,
}

pub struct TraineeCard {
    pub id: String,
    pub name: String,
    pub email: String,
    pub summary: SummaryPanel,
    pub recent: Vec<ProgressRow>,
}

pub struct AssignmentRow {
    pub id: String,
    pub name: String,
    pub role_label: &'static str,
    pub trainers: Vec<Choice>,
}

pub struct AccountRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role_label: &'static str,
}

// --- Estudante / funcionário ---

#[derive(Template)]
#[template(path = "trainee_dashboard.html")]
pub struct TraineeDashboardPage {
    pub shell: Shell,
    pub routines: usize,
    pub logs_this_month: usize,
    pub trainer: Option<String>,
    pub recommendations: Vec<RecommendationRow>,
}

#[derive(Template)]
#[template(path = "trainee_routines.html")]
pub struct TraineeRoutinesPage {
    pub shell: Shell,
    pub mine: Vec<RoutineCard>,
    pub templates: Vec<RoutineCard>,
}

#[derive(Template)]
#[template(path = "exercises.html")]
pub struct ExercisesPage {
    pub shell: Shell,
    pub exercises: Vec<ExerciseRow>,
    pub kinds: Vec<Choice>,
    pub difficulties: Vec<Choice>,
}

#[derive(Template)]
#[template(path = "trainee_progress.html")]
pub struct TraineeProgressPage {
    pub shell: Shell,
    pub summary: SummaryPanel,
    pub logs: Vec<ProgressRow>,
    pub routines: Vec<Choice>,
    pub exercises: Vec<Choice>,
}

// --- Treinador ---

#[derive(Template)]
#[template(path = "instructor_dashboard.html")]
pub struct InstructorDashboardPage {
    pub shell: Shell,
    pub assigned: usize,
    pub templates: usize,
    pub recommendations: usize,
    pub follow_ups: usize,
}

#[derive(Template)]
#[template(path = "instructor_users.html")]
pub struct InstructorUsersPage {
    pub shell: Shell,
    pub trainees: Vec<TraineeCard>,
    pub routines: Vec<Choice>,
}

#[derive(Template)]
#[template(path = "instructor_pre_designed.html")]
pub struct PreDesignedPage {
    pub shell: Shell,
    pub routines: Vec<RoutineCard>,
    pub exercises: Vec<Choice>,
}

// --- Administrador ---

#[derive(Template)]
#[template(path = "admin_dashboard.html")]
pub struct AdminDashboardPage {
    pub shell: Shell,
    pub students: usize,
    pub employees: usize,
    pub instructors: usize,
    pub admins: usize,
    pub exercises: usize,
    pub templates: usize,
}

#[derive(Template)]
#[template(path = "admin_assignments.html")]
pub struct AssignmentsPage {
    pub shell: Shell,
    pub trainees: Vec<AssignmentRow>,
}

#[derive(Template)]
#[template(path = "admin_statistics.html")]
pub struct StatisticsPage {
    pub shell: Shell,
    pub month: String,
    pub users: Vec<UserStatistics>,
    pub instructors: Vec<InstructorStatistics>,
}

#[derive(Template)]
#[template(path = "admin_settings.html")]
pub struct SettingsPage {
    pub shell: Shell,
    pub accounts: Vec<AccountRow>,
    pub contract_types: Vec<String>,
    pub employee_types: Vec<String>,
    pub countries: Vec<String>,
}
