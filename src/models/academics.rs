// src/models/academics.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Program {
    pub code: i64,
    pub name: String,
    pub area: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramPayload {
    pub name: String,
    pub area: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
    pub program: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<i64>,
}

/// Turma (NRC) de uma disciplina.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Group {
    pub nrc: String,
    pub number: i64,
    pub semester: String,
    pub subject: String,
    pub professor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student: String,
    #[serde(rename = "group")]
    #[sqlx(rename = "group_nrc")]
    pub group_nrc: String,
    pub enrollment_date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentPayload {
    pub student: String,
    #[serde(rename = "group")]
    pub group_nrc: String,
    /// Ausente = hoje
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
