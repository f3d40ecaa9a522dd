// src/views.rs
//! Separadores de cada papel e escolha da página a mostrar.
use crate::models::accounts::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Dashboard,
    Routines,
    Exercises,
    Progress,
    MyUsers,
    PreDesigned,
    Assignments,
    Statistics,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 9] = [
        Tab::Dashboard,
        Tab::Routines,
        Tab::Exercises,
        Tab::Progress,
        Tab::MyUsers,
        Tab::PreDesigned,
        Tab::Assignments,
        Tab::Statistics,
        Tab::Settings,
    ];

    /// Segmento de URL (`/app/{slug}`).
    pub fn slug(self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Routines => "routines",
            Tab::Exercises => "exercises",
            Tab::Progress => "progress",
            Tab::MyUsers => "my-users",
            Tab::PreDesigned => "pre-designed",
            Tab::Assignments => "assignments",
            Tab::Statistics => "statistics",
            Tab::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Inicio",
            Tab::Routines => "Mis rutinas",
            Tab::Exercises => "Ejercicios",
            Tab::Progress => "Mi progreso",
            Tab::MyUsers => "Mis usuarios",
            Tab::PreDesigned => "Rutinas prediseñadas",
            Tab::Assignments => "Asignaciones",
            Tab::Statistics => "Estadísticas",
            Tab::Settings => "Configuración",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.slug() == slug)
    }
}

const TRAINEE_TABS: &[Tab] = &[Tab::Dashboard, Tab::Routines, Tab::Exercises, Tab::Progress];
const INSTRUCTOR_TABS: &[Tab] = &[Tab::Dashboard, Tab::MyUsers, Tab::PreDesigned, Tab::Exercises];
const ADMIN_TABS: &[Tab] = &[Tab::Dashboard, Tab::Assignments, Tab::Statistics, Tab::Settings];

/// Separadores visíveis para o papel, pela ordem da navegação.
pub fn tabs_for(role: Role) -> &'static [Tab] {
    match role {
        Role::Student | Role::Employee => TRAINEE_TABS,
        Role::Instructor => INSTRUCTOR_TABS,
        Role::Admin => ADMIN_TABS,
    }
}

/// Separador pedido, se o papel o tiver; caso contrário o painel inicial.
pub fn resolve_tab(role: Role, requested: Option<&str>) -> Tab {
    requested
        .and_then(Tab::from_slug)
        .filter(|tab| tabs_for(role).contains(tab))
        .unwrap_or(Tab::Dashboard)
}

/// Página concreta a renderizar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    TraineeDashboard,
    TraineeRoutines,
    TraineeExercises,
    TraineeProgress,
    InstructorDashboard,
    InstructorUsers,
    InstructorPreDesigned,
    InstructorExercises,
    AdminDashboard,
    AdminAssignments,
    AdminStatistics,
    AdminSettings,
}

pub fn view_for(role: Role, tab: Tab) -> View {
    match role {
        Role::Student | Role::Employee => match tab {
            Tab::Routines => View::TraineeRoutines,
            Tab::Exercises => View::TraineeExercises,
            Tab::Progress => View::TraineeProgress,
            _ => View::TraineeDashboard,
        },
        Role::Instructor => match tab {
            Tab::MyUsers => View::InstructorUsers,
            Tab::PreDesigned => View::InstructorPreDesigned,
            Tab::Exercises => View::InstructorExercises,
            _ => View::InstructorDashboard,
        },
        Role::Admin => match tab {
            Tab::Assignments => View::AdminAssignments,
            Tab::Statistics => View::AdminStatistics,
            Tab::Settings => View::AdminSettings,
            _ => View::AdminDashboard,
        },
    }
}
