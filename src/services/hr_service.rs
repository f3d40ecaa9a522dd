// src/services/hr_service.rs
use crate::{
    error::AppResult,
    models::hr::{ContractType, EmployeeType},
    services::crud::{ensure_found, require_text, CrudService, NoFilter},
};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct ContractTypes;

#[async_trait]
impl CrudService for ContractTypes {
    type Record = ContractType;
    type Payload = ContractType;
    type Filter = NoFilter;
    type Key = String;

    const RESOURCE: &'static str = "Tipo de contrato";

    async fn list(db_pool: &SqlitePool, _filter: NoFilter) -> AppResult<Vec<ContractType>> {
        Ok(
            sqlx::query_as::<_, ContractType>("SELECT name FROM contract_types ORDER BY name")
                .fetch_all(db_pool)
                .await?,
        )
    }

    async fn find(db_pool: &SqlitePool, name: &String) -> AppResult<Option<ContractType>> {
        Ok(
            sqlx::query_as::<_, ContractType>("SELECT name FROM contract_types WHERE name = ?1")
                .bind(name)
                .fetch_optional(db_pool)
                .await?,
        )
    }

    async fn create(db_pool: &SqlitePool, payload: ContractType) -> AppResult<ContractType> {
        require_text("name", &payload.name)?;
        sqlx::query("INSERT INTO contract_types (name) VALUES (?1)")
            .bind(&payload.name)
            .execute(db_pool)
            .await?;
        tracing::info!("✅ Tipo de contrato '{}' criado.", payload.name);
        Ok(payload)
    }

    /// Renomeia. Falha com 400 se houver funcionários a usar o nome antigo.
    async fn update(
        db_pool: &SqlitePool,
        name: &String,
        payload: ContractType,
    ) -> AppResult<ContractType> {
        require_text("name", &payload.name)?;
        let rows = sqlx::query("UPDATE contract_types SET name = ?1 WHERE name = ?2")
            .bind(&payload.name)
            .bind(name)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, name)?;
        Ok(payload)
    }

    async fn delete(db_pool: &SqlitePool, name: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM contract_types WHERE name = ?1")
            .bind(name)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, name)
    }
}

pub struct EmployeeTypes;

#[async_trait]
impl CrudService for EmployeeTypes {
    type Record = EmployeeType;
    type Payload = EmployeeType;
    type Filter = NoFilter;
    type Key = String;

    const RESOURCE: &'static str = "Tipo de funcionário";

    async fn list(db_pool: &SqlitePool, _filter: NoFilter) -> AppResult<Vec<EmployeeType>> {
        Ok(
            sqlx::query_as::<_, EmployeeType>("SELECT name FROM employee_types ORDER BY name")
                .fetch_all(db_pool)
                .await?,
        )
    }

    async fn find(db_pool: &SqlitePool, name: &String) -> AppResult<Option<EmployeeType>> {
        Ok(
            sqlx::query_as::<_, EmployeeType>("SELECT name FROM employee_types WHERE name = ?1")
                .bind(name)
                .fetch_optional(db_pool)
                .await?,
        )
    }

    async fn create(db_pool: &SqlitePool, payload: EmployeeType) -> AppResult<EmployeeType> {
        require_text("name", &payload.name)?;
        sqlx::query("INSERT INTO employee_types (name) VALUES (?1)")
            .bind(&payload.name)
            .execute(db_pool)
            .await?;
        tracing::info!("✅ Tipo de funcionário '{}' criado.", payload.name);
        Ok(payload)
    }

    async fn update(
        db_pool: &SqlitePool,
        name: &String,
        payload: EmployeeType,
    ) -> AppResult<EmployeeType> {
        require_text("name", &payload.name)?;
        let rows = sqlx::query("UPDATE employee_types SET name = ?1 WHERE name = ?2")
            .bind(&payload.name)
            .bind(name)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, name)?;
        Ok(payload)
    }

    async fn delete(db_pool: &SqlitePool, name: &String) -> AppResult<()> {
        let rows = sqlx::query("DELETE FROM employee_types WHERE name = ?1")
            .bind(name)
            .execute(db_pool)
            .await?
            .rows_affected();
        ensure_found(rows, Self::RESOURCE, name)
    }
}
