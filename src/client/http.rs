// src/client/http.rs
use async_trait::async_trait;
use reqwest::Url;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{env, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::sync::RwLock;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Sem barra final, ex: `http://localhost:3000/api`
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// `API_BASE_URL` substitui o endereço padrão.
    pub fn from_env() -> Self {
        let base_url = env::var("API_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

/// Falhas do cliente, já classificadas. São registadas uma vez
/// pelo `ApiClient` e devolvidas sem alteração.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Nenhuma resposta recebida (ligação recusada, timeout...)
    #[error("Sem resposta do servidor: {0}")]
    Network(String),

    #[error("O servidor respondeu {status}: {body}")]
    Status { status: u16, body: String },

    /// O pedido nem chegou a ser montado
    #[error("Não foi possível preparar o pedido: {0}")]
    Setup(String),

    #[error("Resposta ilegível: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

// --- Camada de transporte ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Envia um pedido já montado. Não interpreta o status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let mut builder = self.client.request(request.method.into(), request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                ClientError::Setup(e.to_string())
            } else {
                ClientError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

// --- Cliente ---

/// Cliente da API REST. Barato de clonar: o token é partilhado
/// entre todas as cópias.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(config.base_url.clone(), Arc::new(transport)))
    }

    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.execute(HttpMethod::Get, path, None, None).await?;
        decode(HttpMethod::Get, path, &response)
    }

    /// GET com os campos presentes de `params` na querystring.
    pub async fn get_with<Q, T>(&self, path: &str, params: &Q) -> ClientResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = to_json(HttpMethod::Get, path, params)?;
        let response = self
            .execute(HttpMethod::Get, path, Some(params), None)
            .await?;
        decode(HttpMethod::Get, path, &response)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = to_json(HttpMethod::Post, path, body)?;
        let response = self
            .execute(HttpMethod::Post, path, None, Some(body))
            .await?;
        decode(HttpMethod::Post, path, &response)
    }

    /// POST sem corpo e sem resposta a interpretar.
    pub async fn post_empty(&self, path: &str) -> ClientResult<()> {
        self.execute(HttpMethod::Post, path, None, None)
            .await
            .map(|_| ())
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = to_json(HttpMethod::Put, path, body)?;
        let response = self
            .execute(HttpMethod::Put, path, None, Some(body))
            .await?;
        decode(HttpMethod::Put, path, &response)
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(HttpMethod::Delete, path, None, None)
            .await
            .map(|_| ())
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<Value>,
        body: Option<Value>,
    ) -> ClientResult<HttpResponse> {
        let request = self
            .build_request(method, path, params, body)
            .await
            .inspect_err(|e| log_failure(method, path, e))?;

        tracing::debug!("➡️ {} {}", method.as_str(), request.url);
        let response = self
            .transport
            .send(request)
            .await
            .inspect_err(|e| log_failure(method, path, e))?;

        if (200..300).contains(&response.status) {
            tracing::debug!("⬅️ {} {} -> {}", method.as_str(), path, response.status);
            Ok(response)
        } else {
            let error = ClientError::Status {
                status: response.status,
                body: response.body,
            };
            log_failure(method, path, &error);
            Err(error)
        }
    }

    async fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<Value>,
        body: Option<Value>,
    ) -> ClientResult<HttpRequest> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ClientError::Setup(format!("URL inválida '{}': {}", path, e)))?;

        if let Some(Value::Object(fields)) = params {
            let pairs: Vec<(String, String)> = fields
                .into_iter()
                .filter_map(|(key, value)| query_value(value).map(|value| (key, value)))
                .collect();
            // Sem pares, sem '?'
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if let Some(token) = self.token().await {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body: body.map(|b| b.to_string()),
        })
    }
}

fn query_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn to_json<B: Serialize + ?Sized>(method: HttpMethod, path: &str, body: &B) -> ClientResult<Value> {
    serde_json::to_value(body).map_err(|e| {
        let error = ClientError::Setup(e.to_string());
        log_failure(method, path, &error);
        error
    })
}

fn decode<T: DeserializeOwned>(
    method: HttpMethod,
    path: &str,
    response: &HttpResponse,
) -> ClientResult<T> {
    serde_json::from_str(&response.body).map_err(|e| {
        let error = ClientError::Decode(e.to_string());
        log_failure(method, path, &error);
        error
    })
}

fn log_failure(method: HttpMethod, path: &str, error: &ClientError) {
    let method = method.as_str();
    match error {
        ClientError::Status { status, body } if *status == 401 || *status == 403 => {
            tracing::warn!("🔒 {} {}: acesso negado ({}): {}", method, path, status, body)
        }
        ClientError::Status { status, body } => {
            tracing::error!("❌ {} {}: erro HTTP {}: {}", method, path, status, body)
        }
        ClientError::Network(msg) => {
            tracing::error!("📡 {} {}: sem resposta do servidor: {}", method, path, msg)
        }
        ClientError::Setup(msg) => {
            tracing::error!("⚙️ {} {}: falha ao preparar o pedido: {}", method, path, msg)
        }
        ClientError::Decode(msg) => {
            tracing::error!("{} {}: resposta ilegível: {}", method, path, msg)
        }
    }
}

/// Transporte falso para os testes do cliente: responde por método + caminho
/// e regista cada pedido recebido.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    pub const MOCK_BASE_URL: &str = "http://mock.test/api";

    struct Reply {
        method: HttpMethod,
        target: String,
        outcome: ClientResult<HttpResponse>,
        delay: Option<Duration>,
    }

    #[derive(Default)]
    pub struct MockTransport {
        requests: Mutex<Vec<HttpRequest>>,
        replies: Mutex<Vec<Reply>>,
    }

    impl MockTransport {
        /// `target` é o caminho relativo à base, com querystring.
        pub fn reply(&self, method: HttpMethod, target: &str, status: u16, body: Value) {
            self.push(method, target, Ok(response(status, body)), None);
        }

        pub fn reply_after(
            &self,
            delay: Duration,
            method: HttpMethod,
            target: &str,
            status: u16,
            body: Value,
        ) {
            self.push(method, target, Ok(response(status, body)), Some(delay));
        }

        pub fn fail(&self, method: HttpMethod, target: &str, error: ClientError) {
            self.push(method, target, Err(error), None);
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn push(
            &self,
            method: HttpMethod,
            target: &str,
            outcome: ClientResult<HttpResponse>,
            delay: Option<Duration>,
        ) {
            self.replies.lock().unwrap().push(Reply {
                method,
                target: target.to_string(),
                outcome,
                delay,
            });
        }
    }

    fn response(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            body: if body.is_null() {
                String::new()
            } else {
                body.to_string()
            },
        }
    }

    /// Caminho + querystring, sem a base.
    pub fn target_of(request: &HttpRequest) -> String {
        let full = request.url.as_str();
        full.strip_prefix(MOCK_BASE_URL).unwrap_or(full).to_string()
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
            let target = target_of(&request);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.method == request.method && r.target == target)
                .map(|r| (r.outcome.clone(), r.delay));
            self.requests.lock().unwrap().push(request);

            match reply {
                Some((outcome, delay)) => {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    outcome
                }
                None => Err(ClientError::Network(format!(
                    "nenhuma resposta simulada para {}",
                    target
                ))),
            }
        }
    }

    pub fn mock_client() -> (ApiClient, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::default());
        let client = ApiClient::with_transport(MOCK_BASE_URL, transport.clone());
        (client, transport)
    }

    /// Confirma que houve exatamente um pedido e devolve-o.
    pub fn single_request(transport: &MockTransport) -> HttpRequest {
        let mut requests = transport.requests();
        assert_eq!(requests.len(), 1, "esperado um único pedido: {:?}", requests);
        requests.remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Filter {
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        active: Option<bool>,
    }

    #[test]
    fn default_config_points_to_local_api() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn bearer_token_is_attached_once_set() {
        let (client, transport) = mock_client();
        transport.reply(HttpMethod::Get, "/auth/me/", 200, json!({"username": "admin"}));

        let _: Value = client.get("/auth/me/").await.unwrap();
        client.set_token(Some("abc".into())).await;
        let _: Value = client.get("/auth/me/").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].header("authorization"), None);
        assert_eq!(requests[1].header("Authorization"), Some("Bearer abc"));
        assert_eq!(requests[1].header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn params_become_querystring_and_nulls_are_dropped() {
        let (client, transport) = mock_client();
        let filter = Filter {
            kind: Some("cardio".into()),
            active: None,
        };
        let _ = client.get_with::<_, Value>("/fitness/exercises/", &filter).await;

        let request = single_request(&transport);
        assert_eq!(target_of(&request), "/fitness/exercises/?kind=cardio");
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn empty_params_leave_url_untouched() {
        let (client, transport) = mock_client();
        let filter = Filter {
            kind: None,
            active: None,
        };
        let _ = client.get_with::<_, Value>("/fitness/exercises/", &filter).await;
        assert_eq!(
            target_of(&single_request(&transport)),
            "/fitness/exercises/"
        );
    }

    #[tokio::test]
    async fn error_status_is_classified_and_returned_unchanged() {
        let (client, transport) = mock_client();
        transport.reply(
            HttpMethod::Delete,
            "/fitness/exercises/e1/",
            403,
            json!({"error": "Acesso negado"}),
        );

        let err = client.delete("/fitness/exercises/e1/").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(matches!(err, ClientError::Status { ref body, .. } if body.contains("Acesso negado")));
        // Sem novas tentativas
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn missing_response_is_a_network_error() {
        let (client, _transport) = mock_client();
        let err = client.get::<Value>("/auth/me/").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn unreadable_body_is_a_decode_error() {
        let (client, transport) = mock_client();
        transport.reply(HttpMethod::Get, "/hr/contract-types/", 200, json!("texto"));
        let err = client
            .get::<Vec<Value>>("/hr/contract-types/")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
