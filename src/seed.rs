// src/seed.rs
//! Dados de demonstração: referência académica, três contas (admin,
//! treinador, estudante), a biblioteca base de exercícios e uma rotina
//! pré-desenhada. Correr duas vezes não duplica nada.
use crate::{
    error::AppResult,
    models::{
        accounts::TRAINER_EMPLOYEE_TYPE,
        fitness::{Difficulty, ExerciseKind, RoutineExercise, SYSTEM_AUTHOR},
    },
    services::auth_service,
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

pub const DEMO_PASSWORD: &str = "password123";

pub const DEMO_ADMIN_USERNAME: &str = "admin";
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";

pub const DEMO_TRAINER_USERNAME: &str = "carlos.trainer";
pub const DEMO_TRAINER_EMAIL: &str = "carlos.trainer@unicali.edu.co";
pub const DEMO_TRAINER_ID: &str = "E-1001";

pub const DEMO_STUDENT_USERNAME: &str = "juan.perez";
pub const DEMO_STUDENT_EMAIL: &str = "juan.perez@unicali.edu.co";
pub const DEMO_STUDENT_ID: &str = "S-2024001";

pub const DEMO_GROUP_NRC: &str = "50123";
pub const DEMO_ROUTINE_NAME: &str = "Iniciación integral";

const SYSTEM_EXERCISES: &[(&str, ExerciseKind, Difficulty, f64, &str)] = &[
    ("Trote suave", ExerciseKind::Cardio, Difficulty::Principiante, 20.0, "Trote continuo a ritmo conversacional."),
    ("Bicicleta estática", ExerciseKind::Cardio, Difficulty::Intermedio, 30.0, "Intervalos de 2 minutos a cadencia alta."),
    ("Sentadillas", ExerciseKind::Fuerza, Difficulty::Principiante, 10.0, "Sentadilla libre con el peso corporal."),
    ("Flexiones de pecho", ExerciseKind::Fuerza, Difficulty::Intermedio, 10.0, "Flexiones con el cuerpo alineado."),
    ("Peso muerto", ExerciseKind::Fuerza, Difficulty::Avanzado, 15.0, "Levantamiento desde el suelo con barra."),
    ("Estiramiento de isquiotibiales", ExerciseKind::Movilidad, Difficulty::Principiante, 5.0, "Estiramiento sentado, 30 segundos por lado."),
    ("Movilidad de cadera", ExerciseKind::Movilidad, Difficulty::Principiante, 8.0, "Círculos y aperturas de cadera."),
];

pub async fn seed_demo_data(db_pool: &SqlitePool) -> AppResult<()> {
    seed_demo_data_with_cost(db_pool, bcrypt::DEFAULT_COST).await
}

/// `cost` do bcrypt configurável para os testes correrem depressa.
pub async fn seed_demo_data_with_cost(db_pool: &SqlitePool, cost: u32) -> AppResult<()> {
    let already_seeded: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?1")
            .bind(DEMO_ADMIN_USERNAME)
            .fetch_one(db_pool)
            .await?;
    if already_seeded > 0 {
        tracing::info!("Dados de demonstração já existem, nada a fazer.");
        return Ok(());
    }

    tracing::info!("🌱 Criando dados de demonstração...");
    let admin_hash = auth_service::hash_password_with_cost(DEMO_ADMIN_PASSWORD, cost).await?;
    let demo_hash = auth_service::hash_password_with_cost(DEMO_PASSWORD, cost).await?;
    let now = Utc::now();

    let mut tx = db_pool.begin().await?;

    // --- Referência ---
    let country = sqlx::query("INSERT INTO countries (name) VALUES ('Colombia')")
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
    let department =
        sqlx::query("INSERT INTO departments (name, country) VALUES ('Valle del Cauca', ?1)")
            .bind(country)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
    let city = sqlx::query("INSERT INTO cities (name, department) VALUES ('Cali', ?1)")
        .bind(department)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
    let campus = sqlx::query("INSERT INTO campuses (name, city) VALUES ('Sede Meléndez', ?1)")
        .bind(city)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
    let faculty =
        sqlx::query("INSERT INTO faculties (name, campus) VALUES ('Facultad de Salud', ?1)")
            .bind(campus)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
    let area =
        sqlx::query("INSERT INTO areas (name, faculty) VALUES ('Ciencias del Deporte', ?1)")
            .bind(faculty)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
    let program = sqlx::query(
        "INSERT INTO programs (name, area) VALUES ('Profesional en Ciencias del Deporte', ?1)",
    )
    .bind(area)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();
    sqlx::query(
        "INSERT INTO subjects (code, name, program) VALUES ('DEP-101', 'Fisiología del ejercicio', ?1)",
    )
    .bind(program)
    .execute(&mut *tx)
    .await?;

    for name in ["Planta", "Cátedra", "Prestación de servicios"] {
        sqlx::query("INSERT OR IGNORE INTO contract_types (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    for name in [TRAINER_EMPLOYEE_TYPE, "Docente", "Administrativo"] {
        sqlx::query("INSERT OR IGNORE INTO employee_types (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    // --- Pessoas ---
    sqlx::query(
        r#"
        INSERT INTO students (id, first_name, last_name, email, campus, birth_place, program)
        VALUES (?1, 'Juan', 'Pérez', ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(DEMO_STUDENT_ID)
    .bind(DEMO_STUDENT_EMAIL)
    .bind(campus)
    .bind(city)
    .bind(program)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO employees (id, first_name, last_name, email, contract_type, employee_type,
                               faculty, campus, birth_place)
        VALUES (?1, 'Carlos', 'Ramírez', ?2, 'Planta', ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(DEMO_TRAINER_ID)
    .bind(DEMO_TRAINER_EMAIL)
    .bind(TRAINER_EMPLOYEE_TYPE)
    .bind(faculty)
    .bind(campus)
    .bind(city)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO employees (id, first_name, last_name, email, contract_type, employee_type,
                               faculty, campus, birth_place)
        VALUES ('E-1002', 'Laura', 'Gómez', 'laura.gomez@unicali.edu.co', 'Cátedra', 'Docente',
                ?1, ?2, ?3)
        "#,
    )
    .bind(faculty)
    .bind(campus)
    .bind(city)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO class_groups (nrc, number, semester, subject, professor) \
         VALUES (?1, 1, '2024-2', 'DEP-101', 'E-1002')",
    )
    .bind(DEMO_GROUP_NRC)
    .execute(&mut *tx)
    .await?;

    // --- Contas ---
    sqlx::query(
        "INSERT INTO users (username, password_hash, role, is_active, created_at) \
         VALUES (?1, ?2, 'ADMIN', 1, ?3)",
    )
    .bind(DEMO_ADMIN_USERNAME)
    .bind(&admin_hash)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO users (username, password_hash, role, is_active, created_at, employee) \
         VALUES (?1, ?2, 'EMPLOYEE', 1, ?3, ?4)",
    )
    .bind(DEMO_TRAINER_USERNAME)
    .bind(&demo_hash)
    .bind(now)
    .bind(DEMO_TRAINER_ID)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, role, is_active, created_at, student,
                           assigned_trainer, assigned_at)
        VALUES (?1, ?2, 'STUDENT', 1, ?3, ?4, ?5, ?3)
        "#,
    )
    .bind(DEMO_STUDENT_USERNAME)
    .bind(&demo_hash)
    .bind(now)
    .bind(DEMO_STUDENT_ID)
    .bind(DEMO_TRAINER_USERNAME)
    .execute(&mut *tx)
    .await?;

    // --- Biblioteca de exercícios ---
    let mut exercise_ids = Vec::with_capacity(SYSTEM_EXERCISES.len());
    for (name, kind, difficulty, duration, description) in SYSTEM_EXERCISES {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO exercises (id, name, type, description, duration, difficulty,
                                   created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(*name)
        .bind(*kind)
        .bind(*description)
        .bind(*duration)
        .bind(*difficulty)
        .bind(SYSTEM_AUTHOR)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        exercise_ids.push(id);
    }

    // Trote, sentadillas e estiramento
    let routine_exercises = vec![
        RoutineExercise {
            exercise_id: exercise_ids[0].clone(),
            sets: None,
            reps: None,
            duration: Some(15.0),
            rest_time: Some(60),
            notes: Some("Calentamiento".into()),
        },
        RoutineExercise {
            exercise_id: exercise_ids[2].clone(),
            sets: Some(3),
            reps: Some(12),
            duration: None,
            rest_time: Some(90),
            notes: None,
        },
        RoutineExercise {
            exercise_id: exercise_ids[5].clone(),
            sets: Some(2),
            reps: None,
            duration: Some(5.0),
            rest_time: None,
            notes: None,
        },
    ];
    sqlx::query(
        r#"
        INSERT INTO routines (id, name, description, user_id, exercises, is_pre_designed,
                              created_by, created_at)
        VALUES (?1, ?2, ?3, NULL, ?4, 1, ?5, ?6)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(DEMO_ROUTINE_NAME)
    .bind("Rutina de tres bloques para comenzar: cardio, fuerza y movilidad.")
    .bind(serde_json::to_string(&routine_exercises)?)
    .bind(DEMO_TRAINER_USERNAME)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!("✅ Dados de demonstração criados.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn seeding_twice_changes_nothing() {
        let pool = db::memory_pool().await;
        seed_demo_data_with_cost(&pool, 4).await.unwrap();
        seed_demo_data_with_cost(&pool, 4).await.unwrap();

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        let exercises: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
            .fetch_one(&pool)
            .await
            .unwrap();
        let templates: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM routines WHERE is_pre_designed = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(users, 3);
        assert_eq!(exercises, SYSTEM_EXERCISES.len() as i64);
        assert_eq!(templates, 1);
    }
}
