// src/client/session.rs
use crate::{
    client::{api::auth, http::ApiClient},
    models::accounts::User,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::sync::{watch, Mutex};

/// Chave única guardada pelo cliente: `{token, user}`.
pub const STORAGE_KEY: &str = "auth";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Erro de E/S no armazenamento da sessão: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conteúdo inválido no armazenamento da sessão: {0}")]
    Format(#[from] serde_json::Error),
}

/// Armazenamento chave → texto, no estilo do localStorage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Ficheiro JSON com o mapa chave → texto. Vários processos podem
/// partilhar o mesmo ficheiro (ver `Session::sync_from_store`).
pub struct FileStore {
    path: PathBuf,
    // Serializa ler-alterar-escrever dentro do processo
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

/// O que fica guardado em `STORAGE_KEY`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredAuth {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    Loading,
    Authenticated(User),
}

/// Sessão do cliente. Clones partilham o mesmo estado; as mudanças
/// são publicadas num canal `watch`.
#[derive(Clone)]
pub struct Session {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
    state: Arc<watch::Sender<AuthState>>,
}

impl Session {
    pub fn new(client: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            client,
            store,
            state: Arc::new(state),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.state.borrow() {
            AuthState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Loading)
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: AuthState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    /// Retoma a sessão guardada. Qualquer falha limpa o armazenamento.
    pub async fn restore(&self) {
        self.set_state(AuthState::Loading);
        match self.load_stored().await {
            Ok(Some(stored)) => self.adopt(stored).await,
            Ok(None) => {
                tracing::debug!("Nenhuma sessão guardada.");
                self.set_state(AuthState::Unauthenticated);
            }
            Err(e) => {
                tracing::warn!("Sessão guardada ilegível, a descartar: {}", e);
                self.clear().await;
            }
        }
    }

    async fn adopt(&self, stored: StoredAuth) {
        match (stored.user, stored.token) {
            (Some(user), token) => {
                self.client.set_token(token).await;
                tracing::info!("🔑 Sessão retomada para {}", user.id);
                self.set_state(AuthState::Authenticated(user));
            }
            (None, Some(token)) => {
                self.client.set_token(Some(token.clone())).await;
                match auth::me(&self.client).await {
                    Ok(backend) => {
                        let user = backend.to_user("");
                        self.persist(Some(token), &user).await;
                        tracing::info!("🔑 Sessão retomada via /auth/me para {}", user.id);
                        self.set_state(AuthState::Authenticated(user));
                    }
                    Err(e) => {
                        tracing::warn!("Token guardado recusado ({}), a limpar a sessão.", e);
                        self.clear().await;
                    }
                }
            }
            (None, None) => self.clear().await,
        }
    }

    /// Autentica no backend. Erros são registados e viram `false`.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.set_state(AuthState::Loading);
        match auth::login(&self.client, email, password).await {
            Ok(response) => {
                let user = response.user.to_user(email);
                self.client.set_token(Some(response.token.clone())).await;
                self.persist(Some(response.token), &user).await;
                tracing::info!("✅ Sessão iniciada: {} ({})", user.id, user.role.as_str());
                self.set_state(AuthState::Authenticated(user));
                true
            }
            Err(e) => {
                tracing::warn!("Login falhou para {}: {}", email, e);
                self.set_state(AuthState::Unauthenticated);
                false
            }
        }
    }

    /// Termina a sessão no backend e limpa sempre o estado local,
    /// mesmo que o backend falhe.
    pub async fn logout(&self) {
        if let Err(e) = auth::logout(&self.client).await {
            tracing::warn!("Logout no servidor falhou ({}); a sessão local é limpa na mesma.", e);
        }
        self.clear().await;
        tracing::info!("🚪 Sessão terminada.");
    }

    /// Relê o armazenamento partilhado e aplica logins/logouts feitos
    /// por outro processo.
    pub async fn sync_from_store(&self) {
        match self.load_stored().await {
            Ok(Some(StoredAuth {
                user: Some(user),
                token,
            })) => {
                self.client.set_token(token).await;
                self.set_state(AuthState::Authenticated(user));
            }
            Ok(_) => {
                if self.current_user().is_some() {
                    tracing::debug!("Sessão removida noutro processo.");
                }
                self.client.set_token(None).await;
                self.set_state(AuthState::Unauthenticated);
            }
            Err(e) => tracing::warn!("Não foi possível sincronizar a sessão: {}", e),
        }
    }

    async fn load_stored(&self) -> Result<Option<StoredAuth>, StoreError> {
        match self.store.get(STORAGE_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn persist(&self, token: Option<String>, user: &User) {
        let stored = StoredAuth {
            token,
            user: Some(user.clone()),
        };
        let result = match serde_json::to_string(&stored) {
            Ok(raw) => self.store.set(STORAGE_KEY, raw).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::error!("Não foi possível guardar a sessão: {}", e);
        }
    }

    async fn clear(&self) {
        self.client.set_token(None).await;
        if let Err(e) = self.store.remove(STORAGE_KEY).await {
            tracing::error!("Não foi possível apagar a sessão guardada: {}", e);
        }
        self.set_state(AuthState::Unauthenticated);
    }
}
