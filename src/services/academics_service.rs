// src/services/academics_service.rs
use crate::{
    error::{AppError, AppResult},
    models::academics::{
        Enrollment, EnrollmentFilter, EnrollmentPayload, Group, GroupFilter, Program,
        ProgramFilter, ProgramPayload, Subject, SubjectFilter,
    },
    services::crud::{and_eq, ensure_found, require_text, CrudService},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

// --- Programas ---

pub struct Programs;

#[async_trait]
impl CrudService for Programs {
    type Record = Program;
    type Payload = ProgramPayload;
    type Filter = ProgramFilter;
    type Key = i64;

    const RESOURCE: &'static str = "Programa";

    async fn list(db_pool: &SqlitePool, filter: ProgramFilter) -> AppResult<Vec<Program>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT code, name, area FROM programs WHERE 1 = 1");
        and_eq(&mut qb, "area", filter.area);
        qb.push(" ORDER BY name ASC");
        Ok(qb.build_query_as::<Program>().fetch_all(db_pool).await?)
    }

    async fn find(db_pool: &SqlitePool, code: &i64) -> AppResult<Option<Program>> {
        Ok(
            sqlx::query_as::<_, Program>("SELECT code, name, area FROM programs WHERE code = ?1")
                .bind(code)
                .fetch_optional(db_pool)
                .await?,
        )
    }

    async fn create(db_pool: &SqlitePool, payload: ProgramPayload) -> AppResult<Program> {
        require_text("name", &payload.name)?;
        let code = sqlx::query("INSERT INTO programs (name, area) VALUES (?1, ?2)")
            .bind(payload.name.trim())
            .bind(payload.area)
            .execute(db_pool)
            .await?
            .last_insert_rowid();
        tracing::info!("✅ Programa '{}' criado (código {}).", payload.name, code);
        Ok(Program {
            code,
            name: payload.name.trim().to_string(),
            area: payload.area,
        })
    }

    async fn update(db_pool: &SqlitePool, code: &i64, payload: ProgramPayload) -> AppResult<Program> {
        require_text("name", &payload.name)?;
        let rows = sqlx::query("UPDATE programs SET name = ?1, area = ?2 WHERE code = ?3")
            .bind(payload.name.trim())
            .bind(payload.area)
            .bind(code)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, code)?;
        Ok(Program {
            code: *code,
            name: payload.name.trim().to_string(),
            area: payload.area,
        })
    }

    async fn delete(db_pool: &SqlitePool, code: &i64) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM programs WHERE code = ?1")
            .bind(code)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, code)
    }
}

// --- Disciplinas ---

pub struct Subjects;

#[async_trait]
impl CrudService for Subjects {
    type Record = Subject;
    type Payload = Subject;
    type Filter = SubjectFilter;
    type Key = String;

    const RESOURCE: &'static str = "Disciplina";

    async fn list(db_pool: &SqlitePool, filter: SubjectFilter) -> AppResult<Vec<Subject>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT code, name, program FROM subjects WHERE 1 = 1");
        and_eq(&mut qb, "program", filter.program);
        qb.push(" ORDER BY code ASC");
        Ok(qb.build_query_as::<Subject>().fetch_all(db_pool).await?)
    }

    async fn find(db_pool: &SqlitePool, code: &String) -> AppResult<Option<Subject>> {
        Ok(sqlx::query_as::<_, Subject>(
            "SELECT code, name, program FROM subjects WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(db_pool)
        .await?)
    }

    async fn create(db_pool: &SqlitePool, subject: Subject) -> AppResult<Subject> {
        require_text("code", &subject.code)?;
        require_text("name", &subject.name)?;
        sqlx::query("INSERT INTO subjects (code, name, program) VALUES (?1, ?2, ?3)")
            .bind(&subject.code)
            .bind(&subject.name)
            .bind(subject.program)
            .execute(db_pool)
            .await?;
        tracing::info!("✅ Disciplina '{}' criada.", subject.code);
        Ok(subject)
    }

    async fn update(db_pool: &SqlitePool, code: &String, subject: Subject) -> AppResult<Subject> {
        require_text("name", &subject.name)?;
        let rows = sqlx::query("UPDATE subjects SET name = ?1, program = ?2 WHERE code = ?3")
            .bind(&subject.name)
            .bind(subject.program)
            .bind(code)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, code)?;
        Ok(Subject {
            code: code.clone(),
            ..subject
        })
    }

    async fn delete(db_pool: &SqlitePool, code: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM subjects WHERE code = ?1")
            .bind(code)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, code)
    }
}

// --- Turmas ---

pub struct Groups;

#[async_trait]
impl CrudService for Groups {
    type Record = Group;
    type Payload = Group;
    type Filter = GroupFilter;
    type Key = String;

    const RESOURCE: &'static str = "Turma";

    async fn list(db_pool: &SqlitePool, filter: GroupFilter) -> AppResult<Vec<Group>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT nrc, number, semester, subject, professor FROM class_groups WHERE 1 = 1",
        );
        and_eq(&mut qb, "subject", filter.subject);
        and_eq(&mut qb, "semester", filter.semester);
        and_eq(&mut qb, "professor", filter.professor);
        qb.push(" ORDER BY semester DESC, nrc ASC");
        Ok(qb.build_query_as::<Group>().fetch_all(db_pool).await?)
    }

    async fn find(db_pool: &SqlitePool, nrc: &String) -> AppResult<Option<Group>> {
        Ok(sqlx::query_as::<_, Group>(
            "SELECT nrc, number, semester, subject, professor FROM class_groups WHERE nrc = ?1",
        )
        .bind(nrc)
        .fetch_optional(db_pool)
        .await?)
    }

    async fn create(db_pool: &SqlitePool, group: Group) -> AppResult<Group> {
        require_text("nrc", &group.nrc)?;
        require_text("semester", &group.semester)?;
        sqlx::query(
            "INSERT INTO class_groups (nrc, number, semester, subject, professor) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&group.nrc)
        .bind(group.number)
        .bind(&group.semester)
        .bind(&group.subject)
        .bind(&group.professor)
        .execute(db_pool)
        .await?;
        tracing::info!("✅ Turma '{}' criada.", group.nrc);
        Ok(group)
    }

    async fn update(db_pool: &SqlitePool, nrc: &String, group: Group) -> AppResult<Group> {
        require_text("semester", &group.semester)?;
        let rows = sqlx::query(
            "UPDATE class_groups SET number = ?1, semester = ?2, subject = ?3, professor = ?4 \
             WHERE nrc = ?5",
        )
        .bind(group.number)
        .bind(&group.semester)
        .bind(&group.subject)
        .bind(&group.professor)
        .bind(nrc)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, nrc)?;
        Ok(Group {
            nrc: nrc.clone(),
            ..group
        })
    }

    async fn delete(db_pool: &SqlitePool, nrc: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM class_groups WHERE nrc = ?1")
            .bind(nrc)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, nrc)
    }
}

// --- Matrículas ---

const ENROLLMENT_SELECT: &str =
    "SELECT id, student, group_nrc, enrollment_date, status FROM enrollments";

pub struct Enrollments;

#[async_trait]
impl CrudService for Enrollments {
    type Record = Enrollment;
    type Payload = EnrollmentPayload;
    type Filter = EnrollmentFilter;
    type Key = i64;

    const RESOURCE: &'static str = "Matrícula";

    async fn list(db_pool: &SqlitePool, filter: EnrollmentFilter) -> AppResult<Vec<Enrollment>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ENROLLMENT_SELECT);
        qb.push(" WHERE 1 = 1");
        and_eq(&mut qb, "student", filter.student);
        and_eq(&mut qb, "group_nrc", filter.group);
        and_eq(&mut qb, "status", filter.status);
        qb.push(" ORDER BY enrollment_date DESC, id DESC");
        Ok(qb.build_query_as::<Enrollment>().fetch_all(db_pool).await?)
    }

    async fn find(db_pool: &SqlitePool, id: &i64) -> AppResult<Option<Enrollment>> {
        Ok(
            sqlx::query_as::<_, Enrollment>(&format!("{ENROLLMENT_SELECT} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(db_pool)
                .await?,
        )
    }

    async fn create(db_pool: &SqlitePool, payload: EnrollmentPayload) -> AppResult<Enrollment> {
        require_text("status", &payload.status)?;
        let enrollment_date = payload
            .enrollment_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let id = sqlx::query(
            "INSERT INTO enrollments (student, group_nrc, enrollment_date, status) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&payload.student)
        .bind(&payload.group_nrc)
        .bind(enrollment_date)
        .bind(&payload.status)
        .execute(db_pool)
        .await?
        .last_insert_rowid();
        tracing::info!(
            "✅ Matrícula de {} na turma {} criada.",
            payload.student,
            payload.group_nrc
        );
        Ok(Enrollment {
            id,
            student: payload.student,
            group_nrc: payload.group_nrc,
            enrollment_date,
            status: payload.status,
        })
    }

    async fn update(
        db_pool: &SqlitePool,
        id: &i64,
        payload: EnrollmentPayload,
    ) -> AppResult<Enrollment> {
        require_text("status", &payload.status)?;
        let rows = sqlx::query(
            r#"
            UPDATE enrollments
            SET student = ?1, group_nrc = ?2,
                enrollment_date = COALESCE(?3, enrollment_date), status = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&payload.student)
        .bind(&payload.group_nrc)
        .bind(payload.enrollment_date)
        .bind(&payload.status)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
        ensure_found(rows, Self::RESOURCE, id)?;
        Self::find(db_pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(Self::RESOURCE.into()))
    }

    async fn delete(db_pool: &SqlitePool, id: &i64) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM enrollments WHERE id = ?1")
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
    async fn programs_filter_by_area() {
        let pool = db::memory_pool().await;
        seed::seed_demo_data_with_cost(&pool, 4).await.unwrap();

        let all = Programs::list(&pool, ProgramFilter::default()).await.unwrap();
        assert!(!all.is_empty());
        let area = all[0].area;

        let created = Programs::create(
            &pool,
            ProgramPayload {
                name: "Fisioterapia".into(),
                area,
            },
        )
        .await
        .unwrap();
        let filtered = Programs::list(&pool, ProgramFilter { area: Some(area) })
            .await
            .unwrap();
        assert!(filtered.iter().all(|p| p.area == area));
        assert!(filtered.iter().any(|p| p.code == created.code));

        let none = Programs::list(&pool, ProgramFilter { area: Some(-1) })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_a_conflict() {
        let pool = db::memory_pool().await;
        seed::seed_demo_data_with_cost(&pool, 4).await.unwrap();

        let payload = EnrollmentPayload {
            student: seed::DEMO_STUDENT_ID.into(),
            group_nrc: seed::DEMO_GROUP_NRC.into(),
            enrollment_date: None,
            status: "activa".into(),
        };
        let first = Enrollments::create(&pool, payload.clone()).await.unwrap();
        assert_eq!(first.enrollment_date, Utc::now().date_naive());

        let err = Enrollments::create(&pool, payload).await.unwrap_err();
        assert_eq!(
            err.status_and_message().0,
            axum::http::StatusCode::CONFLICT
        );
    }
}
