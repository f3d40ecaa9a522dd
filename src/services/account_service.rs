// src/services/account_service.rs
use crate::{
    error::{AppError, AppResult},
    models::accounts::{
        Account, AccountFilter, AccountPayload, BackendRole, BackendUser, Employee, Role, Student,
        User,
    },
    services::{
        auth_service,
        crud::{and_eq, ensure_found, require_text, CrudService, NoFilter},
    },
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const ACCOUNT_COLUMNS: &str = "username, password_hash, role, is_active, created_at, \
     student, employee, assigned_trainer, assigned_at";

/// Busca uma conta pelo username.
pub async fn find_account(db_pool: &SqlitePool, username: &str) -> AppResult<Option<Account>> {
    tracing::debug!("Buscando conta por username: {}", username);
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = ?1"
    ))
    .bind(username)
    .fetch_optional(db_pool)
    .await?;
    Ok(account)
}

/// Busca uma conta pelo username ou pelo email do estudante/funcionário ligado.
pub async fn find_account_by_login(db_pool: &SqlitePool, login: &str) -> AppResult<Option<Account>> {
    if let Some(account) = find_account(db_pool, login).await? {
        return Ok(Some(account));
    }
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT u.username, u.password_hash, u.role, u.is_active, u.created_at,
               u.student, u.employee, u.assigned_trainer, u.assigned_at
        FROM users u
        LEFT JOIN students s ON s.id = u.student
        LEFT JOIN employees e ON e.id = u.employee
        WHERE lower(s.email) = lower(?1) OR lower(e.email) = lower(?1)
        LIMIT 1
        "#,
    )
    .bind(login)
    .fetch_optional(db_pool)
    .await?;
    Ok(account)
}

pub async fn find_student(db_pool: &SqlitePool, id: &str) -> AppResult<Option<Student>> {
    let student = sqlx::query_as::<_, Student>(
        "SELECT id, first_name, last_name, email, birth_date, campus, birth_place, program \
         FROM students WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(db_pool)
    .await?;
    Ok(student)
}

pub async fn find_employee(db_pool: &SqlitePool, id: &str) -> AppResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, first_name, last_name, email, contract_type, employee_type, faculty, campus, \
         birth_place FROM employees WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(db_pool)
    .await?;
    Ok(employee)
}

/// Junta à conta os detalhes da pessoa ligada.
pub async fn backend_user(db_pool: &SqlitePool, account: &Account) -> AppResult<BackendUser> {
    let student = match &account.student {
        Some(id) => find_student(db_pool, id).await?,
        None => None,
    };
    let employee = match &account.employee {
        Some(id) => find_employee(db_pool, id).await?,
        None => None,
    };
    Ok(BackendUser::from_account(account, student, employee))
}

/// Papel efetivo da conta (separa treinadores dos restantes funcionários).
pub async fn resolve_role(db_pool: &SqlitePool, account: &Account) -> AppResult<Role> {
    let employee_type = match (&account.role, &account.employee) {
        (BackendRole::Employee, Some(id)) => find_employee(db_pool, id)
            .await?
            .and_then(|e| e.employee_type),
        _ => None,
    };
    Ok(Role::from_backend(
        Some(account.role.as_str()),
        employee_type.as_deref(),
    ))
}

/// Utilizador na forma das páginas.
pub async fn find_user(db_pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    match find_account(db_pool, username).await? {
        Some(account) => Ok(Some(backend_user(db_pool, &account).await?.to_user(""))),
        None => Ok(None),
    }
}

/// Todos os utilizadores na forma das páginas, ordenados por username.
pub async fn list_users(db_pool: &SqlitePool) -> AppResult<Vec<User>> {
    let accounts = Accounts::list_accounts(db_pool, AccountFilter::default()).await?;
    let mut users = Vec::with_capacity(accounts.len());
    for account in &accounts {
        users.push(backend_user(db_pool, account).await?.to_user(""));
    }
    tracing::debug!("Encontrados {} utilizadores.", users.len());
    Ok(users)
}

/// Utilizadores atribuídos a um treinador.
pub async fn list_assigned_users(db_pool: &SqlitePool, trainer: &str) -> AppResult<Vec<User>> {
    let accounts = Accounts::list_accounts(
        db_pool,
        AccountFilter {
            assigned_trainer: Some(trainer.to_string()),
            ..Default::default()
        },
    )
    .await?;
    let mut users = Vec::with_capacity(accounts.len());
    for account in &accounts {
        users.push(backend_user(db_pool, account).await?.to_user(""));
    }
    Ok(users)
}

/// Garante que `trainer` é uma conta de treinador.
async fn ensure_trainer(db_pool: &SqlitePool, trainer: &str) -> AppResult<()> {
    let account = find_account(db_pool, trainer)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Treinador '{}' não existe.", trainer)))?;
    if resolve_role(db_pool, &account).await? != Role::Instructor {
        return Err(AppError::Validation(format!(
            "'{}' não é um treinador.",
            trainer
        )));
    }
    Ok(())
}

/// Atribui (ou remove, com `None`) o treinador de um utilizador.
pub async fn assign_trainer(
    db_pool: &SqlitePool,
    username: &str,
    trainer: Option<&str>,
) -> AppResult<()> {
    if let Some(trainer) = trainer {
        ensure_trainer(db_pool, trainer).await?;
    }
    let rows = write_assignment(db_pool, username, trainer).await?;
    if rows == 0 && find_account(db_pool, username).await?.is_none() {
        return Err(AppError::NotFound("Utilizador".into()));
    }
    Ok(())
}

// Só mexe em `assigned_at` quando o treinador muda
async fn write_assignment<'e, E>(
    executor: E,
    username: &str,
    trainer: Option<&str>,
) -> AppResult<u64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    tracing::info!("Atribuindo treinador {:?} a {}", trainer, username);
    let rows = sqlx::query(
        r#"
        UPDATE users
        SET assigned_trainer = ?1,
            assigned_at = CASE WHEN ?1 IS NULL THEN NULL ELSE ?2 END
        WHERE username = ?3 AND assigned_trainer IS NOT ?1
        "#,
    )
    .bind(trainer)
    .bind(Utc::now())
    .bind(username)
    .execute(executor)
    .await?
    .rows_affected();
    Ok(rows)
}

/// Regras do serializer de criação: estudante liga um estudante, funcionário
/// liga um funcionário, nunca os dois.
fn validate_links(payload: &AccountPayload) -> AppResult<()> {
    require_text("username", &payload.username)?;
    match (payload.role, &payload.student, &payload.employee) {
        (_, Some(_), Some(_)) => Err(AppError::Validation(
            "Uma conta não pode ser estudante e funcionário ao mesmo tempo.".into(),
        )),
        (BackendRole::Student, None, _) => Err(AppError::Validation(
            "Conta de estudante precisa de um estudante associado.".into(),
        )),
        (BackendRole::Employee, _, None) => Err(AppError::Validation(
            "Conta de funcionário precisa de um funcionário associado.".into(),
        )),
        _ => Ok(()),
    }
}

// --- Contas (/accounts/users/) ---

pub struct Accounts;

impl Accounts {
    async fn list_accounts(db_pool: &SqlitePool, filter: AccountFilter) -> AppResult<Vec<Account>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE 1 = 1"));
        and_eq(&mut qb, "role", filter.role.map(|r| r.as_str()));
        and_eq(&mut qb, "assigned_trainer", filter.assigned_trainer);
        qb.push(" ORDER BY username ASC");
        Ok(qb.build_query_as::<Account>().fetch_all(db_pool).await?)
    }
}

#[async_trait]
impl CrudService for Accounts {
    type Record = BackendUser;
    type Payload = AccountPayload;
    type Filter = AccountFilter;
    type Key = String;

    const RESOURCE: &'static str = "Utilizador";

    async fn list(db_pool: &SqlitePool, filter: AccountFilter) -> AppResult<Vec<BackendUser>> {
        let accounts = Self::list_accounts(db_pool, filter).await?;
        let mut users = Vec::with_capacity(accounts.len());
        for account in &accounts {
            users.push(backend_user(db_pool, account).await?);
        }
        Ok(users)
    }

    async fn find(db_pool: &SqlitePool, username: &String) -> AppResult<Option<BackendUser>> {
        match find_account(db_pool, username).await? {
            Some(account) => Ok(Some(backend_user(db_pool, &account).await?)),
            None => Ok(None),
        }
    }

    async fn create(db_pool: &SqlitePool, payload: AccountPayload) -> AppResult<BackendUser> {
        validate_links(&payload)?;
        let password = payload
            .password
            .as_deref()
            .filter(|p| p.len() >= 4)
            .ok_or_else(|| AppError::Validation("Senha com pelo menos 4 caracteres.".into()))?;
        if let Some(trainer) = payload.assigned_trainer.as_deref() {
            ensure_trainer(db_pool, trainer).await?;
        }

        tracing::info!("Tentando criar conta: {}", payload.username);
        let password_hash = auth_service::hash_password(password).await?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, is_active, created_at,
                               student, employee, assigned_trainer, assigned_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&payload.username)
        .bind(password_hash)
        .bind(payload.role)
        .bind(payload.is_active.unwrap_or(true))
        .bind(now)
        .bind(&payload.student)
        .bind(&payload.employee)
        .bind(&payload.assigned_trainer)
        .bind(payload.assigned_trainer.as_ref().map(|_| now))
        .execute(db_pool)
        .await?;

        tracing::info!("✅ Conta '{}' criada com sucesso.", payload.username);
        Self::find(db_pool, &payload.username)
            .await?
            .ok_or(AppError::InternalServerError)
    }

    async fn update(
        db_pool: &SqlitePool,
        username: &String,
        payload: AccountPayload,
    ) -> AppResult<BackendUser> {
        validate_links(&payload)?;
        if payload.username != *username {
            return Err(AppError::Validation(
                "O username não pode ser alterado.".into(),
            ));
        }

        if let Some(trainer) = payload.assigned_trainer.as_deref() {
            ensure_trainer(db_pool, trainer).await?;
        }
        let password_hash = match payload.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(auth_service::hash_password(password).await?),
            None => None,
        };

        let mut tx = db_pool.begin().await?;
        let rows = sqlx::query(
            r#"
            UPDATE users
            SET role = ?1, is_active = ?2, student = ?3, employee = ?4
            WHERE username = ?5
            "#,
        )
        .bind(payload.role)
        .bind(payload.is_active.unwrap_or(true))
        .bind(&payload.student)
        .bind(&payload.employee)
        .bind(username)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, username)?;

        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = ?1 WHERE username = ?2")
                .bind(password_hash)
                .bind(username)
                .execute(&mut *tx)
                .await?;
            tracing::info!("Senha alterada para a conta {}", username);
        }
        write_assignment(&mut *tx, username, payload.assigned_trainer.as_deref()).await?;
        tx.commit().await?;

        tracing::info!("✅ Conta '{}' atualizada.", username);
        Self::find(db_pool, username)
            .await?
            .ok_or_else(|| AppError::NotFound(Self::RESOURCE.into()))
    }

    async fn delete(db_pool: &SqlitePool, username: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM users WHERE username = ?1")
            .bind(username)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, username)
    }
}

// --- Estudantes (/accounts/students/) ---

pub struct Students;

#[async_trait]
impl CrudService for Students {
    type Record = Student;
    type Payload = Student;
    type Filter = NoFilter;
    type Key = String;

    const RESOURCE: &'static str = "Estudante";

    async fn list(db_pool: &SqlitePool, _filter: NoFilter) -> AppResult<Vec<Student>> {
        Ok(sqlx::query_as::<_, Student>(
            "SELECT id, first_name, last_name, email, birth_date, campus, birth_place, program \
             FROM students ORDER BY last_name, first_name",
        )
        .fetch_all(db_pool)
        .await?)
    }

    async fn find(db_pool: &SqlitePool, id: &String) -> AppResult<Option<Student>> {
        find_student(db_pool, id).await
    }

    async fn create(db_pool: &SqlitePool, student: Student) -> AppResult<Student> {
        require_text("id", &student.id)?;
        require_text("first_name", &student.first_name)?;
        require_text("email", &student.email)?;
        sqlx::query(
            r#"
            INSERT INTO students (id, first_name, last_name, email, birth_date, campus,
                                  birth_place, program)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&student.id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(student.birth_date)
        .bind(student.campus)
        .bind(student.birth_place)
        .bind(student.program)
        .execute(db_pool)
        .await?;
        tracing::info!("✅ Estudante '{}' criado.", student.id);
        Ok(student)
    }

    async fn update(db_pool: &SqlitePool, id: &String, student: Student) -> AppResult<Student> {
        require_text("first_name", &student.first_name)?;
        require_text("email", &student.email)?;
        let rows = sqlx::query(
            r#"
            UPDATE students
            SET first_name = ?1, last_name = ?2, email = ?3, birth_date = ?4, campus = ?5,
                birth_place = ?6, program = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(student.birth_date)
        .bind(student.campus)
        .bind(student.birth_place)
        .bind(student.program)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)?;
        Ok(Student {
            id: id.clone(),
            ..student
        })
    }

    async fn delete(db_pool: &SqlitePool, id: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(id)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)
    }
}

// --- Funcionários (/accounts/employees/) ---

pub struct Employees;

#[async_trait]
impl CrudService for Employees {
    type Record = Employee;
    type Payload = Employee;
    type Filter = NoFilter;
    type Key = String;

    const RESOURCE: &'static str = "Funcionário";

    async fn list(db_pool: &SqlitePool, _filter: NoFilter) -> AppResult<Vec<Employee>> {
        Ok(sqlx::query_as::<_, Employee>(
            "SELECT id, first_name, last_name, email, contract_type, employee_type, faculty, \
             campus, birth_place FROM employees ORDER BY last_name, first_name",
        )
        .fetch_all(db_pool)
        .await?)
    }

    async fn find(db_pool: &SqlitePool, id: &String) -> AppResult<Option<Employee>> {
        find_employee(db_pool, id).await
    }

    async fn create(db_pool: &SqlitePool, employee: Employee) -> AppResult<Employee> {
        require_text("id", &employee.id)?;
        require_text("first_name", &employee.first_name)?;
        require_text("email", &employee.email)?;
        sqlx::query(
            r#"
            INSERT INTO employees (id, first_name, last_name, email, contract_type,
                                   employee_type, faculty, campus, birth_place)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.contract_type)
        .bind(&employee.employee_type)
        .bind(employee.faculty)
        .bind(employee.campus)
        .bind(employee.birth_place)
        .execute(db_pool)
        .await?;
        tracing::info!("✅ Funcionário '{}' criado.", employee.id);
        Ok(employee)
    }

    async fn update(db_pool: &SqlitePool, id: &String, employee: Employee) -> AppResult<Employee> {
        require_text("first_name", &employee.first_name)?;
        require_text("email", &employee.email)?;
        let rows = sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?1, last_name = ?2, email = ?3, contract_type = ?4,
                employee_type = ?5, faculty = ?6, campus = ?7, birth_place = ?8
            WHERE id = ?9
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.contract_type)
        .bind(&employee.employee_type)
        .bind(employee.faculty)
        .bind(employee.campus)
        .bind(employee.birth_place)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)?;
        Ok(Employee {
            id: id.clone(),
            ..employee
        })
    }

    async fn delete(db_pool: &SqlitePool, id: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM employees WHERE id = ?1")
            .bind(id)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, seed};

    #[tokio::test]
    async fn trainer_resolves_to_instructor_role() {
        let pool = db::memory_pool().await;
        seed::seed_demo_data_with_cost(&pool, 4).await.unwrap();

        let trainer = find_account(&pool, seed::DEMO_TRAINER_USERNAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolve_role(&pool, &trainer).await.unwrap(), Role::Instructor);

        let user = find_user(&pool, seed::DEMO_STUDENT_USERNAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.email, seed::DEMO_STUDENT_EMAIL);
    }

    #[tokio::test]
    async fn assignment_requires_a_trainer() {
        let pool = db::memory_pool().await;
        seed::seed_demo_data_with_cost(&pool, 4).await.unwrap();

        let err = assign_trainer(&pool, seed::DEMO_STUDENT_USERNAME, Some("admin")).await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        assign_trainer(&pool, seed::DEMO_STUDENT_USERNAME, None).await.unwrap();
        let user = find_user(&pool, seed::DEMO_STUDENT_USERNAME).await.unwrap().unwrap();
        assert_eq!(user.assigned_trainer_id, None);

        assign_trainer(
            &pool,
            seed::DEMO_STUDENT_USERNAME,
            Some(seed::DEMO_TRAINER_USERNAME),
        )
        .await
        .unwrap();
        let assigned = list_assigned_users(&pool, seed::DEMO_TRAINER_USERNAME)
            .await
            .unwrap();
        assert!(assigned.iter().any(|u| u.id == seed::DEMO_STUDENT_USERNAME));
    }

    #[tokio::test]
    async fn account_must_link_exactly_one_person() {
        let pool = db::memory_pool().await;
        let payload = AccountPayload {
            username: "sem.pessoa".into(),
            password: Some("segredo".into()),
            role: BackendRole::Student,
            is_active: None,
            student: None,
            employee: None,
            assigned_trainer: None,
        };
        let err = Accounts::create(&pool, payload).await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn rejected_update_leaves_account_untouched() {
        let pool = db::memory_pool().await;
        seed::seed_demo_data_with_cost(&pool, 4).await.unwrap();
        let username = seed::DEMO_STUDENT_USERNAME.to_string();
        let before = find_account(&pool, &username).await.unwrap().unwrap();
        assert!(before.is_active);

        let payload = AccountPayload {
            username: username.clone(),
            password: Some("outra-senha".into()),
            role: BackendRole::Student,
            is_active: Some(false),
            student: before.student.clone(),
            employee: None,
            assigned_trainer: Some("admin".into()),
        };
        let err = Accounts::update(&pool, &username, payload).await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        let after = find_account(&pool, &username).await.unwrap().unwrap();
        assert!(after.is_active);
        assert_eq!(after.password_hash, before.password_hash);
        assert_eq!(after.assigned_trainer, before.assigned_trainer);
    }

    #[tokio::test]
    async fn update_commits_assignment_with_the_rest() {
        let pool = db::memory_pool().await;
        seed::seed_demo_data_with_cost(&pool, 4).await.unwrap();
        let username = seed::DEMO_STUDENT_USERNAME.to_string();
        let before = find_account(&pool, &username).await.unwrap().unwrap();

        let payload = AccountPayload {
            username: username.clone(),
            password: None,
            role: BackendRole::Student,
            is_active: Some(false),
            student: before.student.clone(),
            employee: None,
            assigned_trainer: None,
        };
        Accounts::update(&pool, &username, payload).await.unwrap();

        let after = find_account(&pool, &username).await.unwrap().unwrap();
        assert!(!after.is_active);
        assert_eq!(after.assigned_trainer, None);
        assert_eq!(after.assigned_at, None);
    }
}
