// src/models/locations.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Hierarquia: país > departamento > cidade > campus > faculdade > área.
// Cada nível guarda o código do nível acima.

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Country {
    pub code: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryPayload {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Department {
    pub code: i64,
    pub name: String,
    pub country: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentPayload {
    pub name: String,
    pub country: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct City {
    pub code: i64,
    pub name: String,
    pub department: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityPayload {
    pub name: String,
    pub department: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Campus {
    pub code: i64,
    pub name: String,
    pub city: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusPayload {
    pub name: String,
    pub city: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Faculty {
    pub code: i64,
    pub name: String,
    pub campus: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultyPayload {
    pub name: String,
    pub campus: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Area {
    pub code: i64,
    pub name: String,
    pub faculty: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaPayload {
    pub name: String,
    pub faculty: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampusFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacultyFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<i64>,
}
