// src/models/accounts.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tipo de funcionário que identifica um treinador.
pub const TRAINER_EMPLOYEE_TYPE: &str = "Entrenador";

/// Papel guardado na base de dados (e devolvido pela API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum BackendRole {
    #[serde(alias = "student")]
    Student,
    #[serde(alias = "employee")]
    Employee,
    #[serde(alias = "admin")]
    Admin,
}

impl BackendRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "STUDENT" => Some(BackendRole::Student),
            "EMPLOYEE" => Some(BackendRole::Employee),
            "ADMIN" => Some(BackendRole::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendRole::Student => "STUDENT",
            BackendRole::Employee => "EMPLOYEE",
            BackendRole::Admin => "ADMIN",
        }
    }
}

/// Papel visto pela aplicação. Os funcionários dividem-se em
/// treinadores (`Instructor`) e restantes (`Employee`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Employee,
    Instructor,
    Admin,
}

impl Role {
    /// Traduz o papel do backend. Papel desconhecido ou ausente vira `Student`.
    pub fn from_backend(role: Option<&str>, employee_type: Option<&str>) -> Role {
        match role.and_then(BackendRole::parse) {
            Some(BackendRole::Student) => Role::Student,
            Some(BackendRole::Employee) if employee_type == Some(TRAINER_EMPLOYEE_TYPE) => {
                Role::Instructor
            }
            Some(BackendRole::Employee) => Role::Employee,
            Some(BackendRole::Admin) => Role::Admin,
            None => Role::Student,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Employee => "employee",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Estudiante",
            Role::Employee => "Empleado",
            Role::Instructor => "Entrenador",
            Role::Admin => "Administrador",
        }
    }

    /// Estudantes e funcionários: quem segue rotinas e regista progresso.
    pub fn is_trainee(self) -> bool {
        matches!(self, Role::Student | Role::Employee)
    }
}

/// Utilizador na forma usada pelo cliente e pelas páginas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_trainer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect::<String>()
            .to_uppercase()
    }
}

// --- Linhas da base de dados ---

/// Conta de acesso (tabela `users`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: BackendRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub student: Option<String>,
    pub employee: Option<String>,
    pub assigned_trainer: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub campus: Option<i64>,
    #[serde(default)]
    pub birth_place: Option<i64>,
    #[serde(default)]
    pub program: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub employee_type: Option<String>,
    #[serde(default)]
    pub faculty: Option<i64>,
    #[serde(default)]
    pub campus: Option<i64>,
    #[serde(default)]
    pub birth_place: Option<i64>,
}

// --- Formatos da API ---

/// Utilizador como o backend o devolve (conta + detalhes da pessoa).
/// Todos os campos são opcionais: o cliente não confia na forma.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub student: Option<String>,
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub assigned_trainer: Option<String>,
    #[serde(default)]
    pub student_details: Option<Student>,
    #[serde(default)]
    pub employee_details: Option<Employee>,
}

impl BackendUser {
    pub fn from_account(
        account: &Account,
        student: Option<Student>,
        employee: Option<Employee>,
    ) -> Self {
        Self {
            username: Some(account.username.clone()),
            role: Some(account.role.as_str().to_string()),
            is_active: Some(account.is_active),
            created_at: Some(account.created_at),
            student: account.student.clone(),
            employee: account.employee.clone(),
            assigned_trainer: account.assigned_trainer.clone(),
            student_details: student,
            employee_details: employee,
        }
    }

    pub fn employee_type(&self) -> Option<&str> {
        self.employee_details
            .as_ref()
            .and_then(|e| e.employee_type.as_deref())
    }

    /// Converte para a forma `User`. `fallback_email` é usado quando
    /// a conta não tem pessoa associada (ex: o email digitado no login).
    pub fn to_user(&self, fallback_email: &str) -> User {
        let student = self.student_details.as_ref();
        let employee = self.employee_details.as_ref();

        let id = self
            .username
            .clone()
            .or_else(|| self.student.clone())
            .or_else(|| self.employee.clone())
            .unwrap_or_default();
        let email = student
            .map(|s| s.email.clone())
            .or_else(|| employee.map(|e| e.email.clone()))
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| fallback_email.to_string());
        let first_name = student
            .map(|s| s.first_name.clone())
            .or_else(|| employee.map(|e| e.first_name.clone()))
            .unwrap_or_default();
        let last_name = student
            .map(|s| s.last_name.clone())
            .or_else(|| employee.map(|e| e.last_name.clone()))
            .unwrap_or_default();

        User {
            id,
            email,
            first_name,
            last_name,
            role: Role::from_backend(self.role.as_deref(), self.employee_type()),
            employee_type: self.employee_type().map(str::to_string),
            assigned_trainer_id: self.assigned_trainer.clone(),
            program_id: student.and_then(|s| s.program).map(|p| p.to_string()),
            department_id: employee.and_then(|e| e.faculty).map(|f| f.to_string()),
        }
    }
}

/// Corpo de criação/atualização de contas (`/accounts/users/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountPayload {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: BackendRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub student: Option<String>,
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub assigned_trainer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<BackendRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_trainer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: BackendUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(employee_type: &str) -> Employee {
        Employee {
            id: "E-1".into(),
            first_name: "Carlos".into(),
            last_name: "Gómez".into(),
            email: "carlos@unicali.edu.co".into(),
            contract_type: None,
            employee_type: Some(employee_type.into()),
            faculty: Some(3),
            campus: None,
            birth_place: None,
        }
    }

    #[test]
    fn role_mapping_table() {
        assert_eq!(Role::from_backend(Some("STUDENT"), None), Role::Student);
        assert_eq!(
            Role::from_backend(Some("EMPLOYEE"), Some("Entrenador")),
            Role::Instructor
        );
        assert_eq!(
            Role::from_backend(Some("EMPLOYEE"), Some("Administrativo")),
            Role::Employee
        );
        assert_eq!(Role::from_backend(Some("EMPLOYEE"), None), Role::Employee);
        assert_eq!(Role::from_backend(Some("ADMIN"), None), Role::Admin);
        assert_eq!(Role::from_backend(Some("JANITOR"), None), Role::Student);
        assert_eq!(Role::from_backend(None, None), Role::Student);
    }

    #[test]
    fn backend_role_accepts_lowercase() {
        let role: BackendRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, BackendRole::Admin);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn trainer_backend_user_becomes_instructor() {
        let backend = BackendUser {
            username: Some("carlos".into()),
            role: Some("EMPLOYEE".into()),
            employee: Some("E-1".into()),
            employee_details: Some(employee("Entrenador")),
            ..Default::default()
        };
        let user = backend.to_user("ignorado@x.co");
        assert_eq!(user.id, "carlos");
        assert_eq!(user.role, Role::Instructor);
        assert_eq!(user.email, "carlos@unicali.edu.co");
        assert_eq!(user.department_id.as_deref(), Some("3"));
        assert_eq!(user.full_name(), "Carlos Gómez");
        assert_eq!(user.initials(), "CG");
    }

    #[test]
    fn bare_backend_user_uses_fallbacks() {
        let backend = BackendUser {
            student: Some("S-9".into()),
            ..Default::default()
        };
        let user = backend.to_user("typed@unicali.edu.co");
        assert_eq!(user.id, "S-9");
        assert_eq!(user.email, "typed@unicali.edu.co");
        assert_eq!(user.role, Role::Student);
    }
}
