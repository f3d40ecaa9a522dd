// src/client/mod.rs
//! Cliente da API REST: transporte HTTP, funções por recurso,
//! sessão de autenticação e queries com proteção contra respostas obsoletas.
pub mod api;
pub mod fetch;
pub mod http;
pub mod session;

pub use http::{ApiClient, ClientConfig, ClientError, ClientResult};
pub use session::{AuthState, Session};
