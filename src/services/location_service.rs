// src/services/location_service.rs
use crate::{
    error::AppResult,
    models::locations::{
        Area, AreaFilter, AreaPayload, Campus, CampusFilter, CampusPayload, City, CityFilter,
        CityPayload, Country, CountryPayload, Department, DepartmentFilter, DepartmentPayload,
        Faculty, FacultyFilter, FacultyPayload,
    },
    services::crud::{and_eq, ensure_found, require_text, CrudService, NoFilter},
};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct Countries;

#[async_trait]
impl CrudService for Countries {
    type Record = Country;
    type Payload = CountryPayload;
    type Filter = NoFilter;
    type Key = i64;

    const RESOURCE: &'static str = "País";

    async fn list(db_pool: &SqlitePool, _filter: NoFilter) -> AppResult<Vec<Country>> {
        Ok(
            sqlx::query_as::<_, Country>("SELECT code, name FROM countries ORDER BY name")
                .fetch_all(db_pool)
                .await?,
        )
    }

    async fn find(db_pool: &SqlitePool, code: &i64) -> AppResult<Option<Country>> {
        Ok(
            sqlx::query_as::<_, Country>("SELECT code, name FROM countries WHERE code = ?1")
                .bind(code)
                .fetch_optional(db_pool)
                .await?,
        )
    }

    async fn create(db_pool: &SqlitePool, payload: CountryPayload) -> AppResult<Country> {
        require_text("name", &payload.name)?;
        let code = sqlx::query("INSERT INTO countries (name) VALUES (?1)")
            .bind(payload.name.trim())
            .execute(db_pool)
            .await?
            .last_insert_rowid();
        tracing::info!("✅ País '{}' criado.", payload.name);
        Ok(Country {
            code,
            name: payload.name.trim().to_string(),
        })
    }

    async fn update(db_pool: &SqlitePool, code: &i64, payload: CountryPayload) -> AppResult<Country> {
        require_text("name", &payload.name)?;
        let rows = sqlx::query("UPDATE countries SET name = ?1 WHERE code = ?2")
            .bind(payload.name.trim())
            .bind(code)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, code)?;
        Ok(Country {
            code: *code,
            name: payload.name.trim().to_string(),
        })
    }

    async fn delete(db_pool: &SqlitePool, code: &i64) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM countries WHERE code = ?1")
            .bind(code)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, code)
    }
}

// Os níveis abaixo do país têm todos a forma {code, name, <pai>}:
// só mudam a tabela e a coluna do nível acima.
macro_rules! location_level {
    ($service:ident, $record:ident, $payload:ident, $filter:ident,
     $table:literal, $parent:ident, $resource:literal) => {
        pub struct $service;

        #[async_trait]
        impl CrudService for $service {
            type Record = $record;
            type Payload = $payload;
            type Filter = $filter;
            type Key = i64;

            const RESOURCE: &'static str = $resource;

            async fn list(db_pool: &SqlitePool, filter: $filter) -> AppResult<Vec<$record>> {
                let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(concat!(
                    "SELECT code, name, ",
                    stringify!($parent),
                    " FROM ",
                    $table,
                    " WHERE 1 = 1"
                ));
                and_eq(&mut qb, stringify!($parent), filter.$parent);
                qb.push(" ORDER BY name ASC");
                Ok(qb.build_query_as::<$record>().fetch_all(db_pool).await?)
            }

            async fn find(db_pool: &SqlitePool, code: &i64) -> AppResult<Option<$record>> {
                Ok(sqlx::query_as::<_, $record>(concat!(
                    "SELECT code, name, ",
                    stringify!($parent),
                    " FROM ",
                    $table,
                    " WHERE code = ?1"
                ))
                .bind(code)
                .fetch_optional(db_pool)
                .await?)
            }

            async fn create(db_pool: &SqlitePool, payload: $payload) -> AppResult<$record> {
                require_text("name", &payload.name)?;
                let code = sqlx::query(concat!(
                    "INSERT INTO ",
                    $table,
                    " (name, ",
                    stringify!($parent),
                    ") VALUES (?1, ?2)"
                ))
                .bind(payload.name.trim())
                .bind(payload.$parent)
                .execute(db_pool)
                .await?
                .last_insert_rowid();
                tracing::info!("✅ {} '{}' criado (código {}).", $resource, payload.name, code);
                Ok($record {
                    code,
                    name: payload.name.trim().to_string(),
                    $parent: payload.$parent,
                })
            }

            async fn update(
                db_pool: &SqlitePool,
                code: &i64,
                payload: $payload,
            ) -> AppResult<$record> {
                require_text("name", &payload.name)?;
                let rows = sqlx::query(concat!(
                    "UPDATE ",
                    $table,
                    " SET name = ?1, ",
                    stringify!($parent),
                    " = ?2 WHERE code = ?3"
                ))
                .bind(payload.name.trim())
                .bind(payload.$parent)
                .bind(code)
                .execute(db_pool)
                .await?
                .rows_affected();
                ensure_found(rows, Self::RESOURCE, code)?;
                Ok($record {
                    code: *code,
                    name: payload.name.trim().to_string(),
                    $parent: payload.$parent,
                })
            }

            async fn delete(db_pool: &SqlitePool, code: &i64) -> AppResult<()> {
                let rows = sqlx::query(concat!("DELETE FROM ", $table, " WHERE code = ?1"))
                    .bind(code)
                    .execute(db_pool)
                    .await?
                    .rows_affected();
                ensure_found(rows, Self::RESOURCE, code)
            }
        }
    };
}

location_level!(Departments, Department, DepartmentPayload, DepartmentFilter, "departments", country, "Departamento");
location_level!(Cities, City, CityPayload, CityFilter, "cities", department, "Cidade");
location_level!(Campuses, Campus, CampusPayload, CampusFilter, "campuses", city, "Campus");
location_level!(Faculties, Faculty, FacultyPayload, FacultyFilter, "faculties", campus, "Faculdade");
location_level!(Areas, Area, AreaPayload, AreaFilter, "areas", faculty, "Área");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, error::AppError};

    #[tokio::test]
    async fn hierarchy_filters_by_parent() {
        let pool = db::memory_pool().await;
        let colombia = Countries::create(&pool, CountryPayload { name: "Colombia".into() })
            .await
            .unwrap();
        let peru = Countries::create(&pool, CountryPayload { name: "Perú".into() })
            .await
            .unwrap();

        let valle = Departments::create(
            &pool,
            DepartmentPayload {
                name: "Valle del Cauca".into(),
                country: colombia.code,
            },
        )
        .await
        .unwrap();
        Departments::create(
            &pool,
            DepartmentPayload {
                name: "Lima".into(),
                country: peru.code,
            },
        )
        .await
        .unwrap();

        let in_colombia = Departments::list(
            &pool,
            DepartmentFilter {
                country: Some(colombia.code),
            },
        )
        .await
        .unwrap();
        assert_eq!(in_colombia, vec![valle.clone()]);

        let cali = Cities::create(
            &pool,
            CityPayload {
                name: "Cali".into(),
                department: valle.code,
            },
        )
        .await
        .unwrap();
        assert_eq!(Cities::find(&pool, &cali.code).await.unwrap(), Some(cali));
    }

    #[tokio::test]
    async fn unknown_parent_is_a_bad_reference() {
        let pool = db::memory_pool().await;
        let err = Cities::create(
            &pool,
            CityPayload {
                name: "Nowhere".into(),
                department: 999,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.status_and_message().0,
            axum::http::StatusCode::BAD_REQUEST
        );
        assert!(matches!(
            Areas::delete(&pool, &1).await,
            Err(AppError::NotFound(_))
        ));
    }
}
