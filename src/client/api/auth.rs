// src/client/api/auth.rs
use crate::{
    client::http::{ApiClient, ClientResult},
    models::accounts::{BackendUser, LoginRequest, LoginResponse},
};

pub async fn login(client: &ApiClient, email: &str, password: &str) -> ClientResult<LoginResponse> {
    let body = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    client.post("/auth/login/", &body).await
}

pub async fn logout(client: &ApiClient) -> ClientResult<()> {
    client.post_empty("/auth/logout/").await
}

pub async fn me(client: &ApiClient) -> ClientResult<BackendUser> {
    client.get("/auth/me/").await
}
