// src/client/api/mod.rs
//! Um módulo por família de recursos da API. Cada função faz exatamente
//! um pedido e devolve o resultado do `ApiClient` tal como veio.
use std::fmt::Display;

/// Gera `list/get/create/update/delete` para um recurso REST
/// (`GET/POST /res/`, `GET/PUT/DELETE /res/{id}/`).
macro_rules! rest_resource {
    ($name:ident, $path:literal, $record:ty, $payload:ty, $filter:ty) => {
        pub mod $name {
            use super::*;
            use $crate::client::{
                api::item_path,
                http::{ApiClient, ClientResult},
            };
            use std::fmt::Display;

            pub const PATH: &str = concat!($path, "/");

            pub async fn list(client: &ApiClient, filter: &$filter) -> ClientResult<Vec<$record>> {
                client.get_with(PATH, filter).await
            }

            pub async fn get(client: &ApiClient, id: impl Display) -> ClientResult<$record> {
                client.get(&item_path($path, id)).await
            }

            pub async fn create(client: &ApiClient, payload: &$payload) -> ClientResult<$record> {
                client.post(PATH, payload).await
            }

            pub async fn update(
                client: &ApiClient,
                id: impl Display,
                payload: &$payload,
            ) -> ClientResult<$record> {
                client.put(&item_path($path, id), payload).await
            }

            pub async fn delete(client: &ApiClient, id: impl Display) -> ClientResult<()> {
                client.delete(&item_path($path, id)).await
            }
        }
    };
}

pub mod academics;
pub mod accounts;
pub mod auth;
pub mod fitness;
pub mod hr;
pub mod locations;

/// `/base/{id}/`, com o id codificado.
pub(crate) fn item_path(base: &str, id: impl Display) -> String {
    format!("{}/{}/", base, urlencoding::encode(&id.to_string()))
}
