// src/client/fetch.rs
use crate::{
    client::{
        api::fitness,
        http::{ApiClient, ClientResult},
    },
    models::fitness::{
        Exercise, ExerciseFilter, ProgressFilter, ProgressLog, Routine, RoutineFilter,
        TrainerFilter, TrainerRecommendation,
    },
};
use futures_util::{future::BoxFuture, FutureExt};
use serde::Serialize;
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::sync::RwLock;

type Fetcher<P, T> =
    Arc<dyn Fn(ApiClient, P) -> BoxFuture<'static, ClientResult<T>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<P, T> {
    pub params: P,
    pub data: Option<T>,
    pub loading: bool,
    /// Texto do erro da última busca, se falhou
    pub error: Option<String>,
}

/// Busca assíncrona com parâmetros. Cada busca recebe uma geração;
/// só o resultado da geração mais recente é aplicado.
pub struct Query<P, T> {
    client: ApiClient,
    fetcher: Fetcher<P, T>,
    state: Arc<RwLock<QueryState<P, T>>>,
    generation: Arc<AtomicU64>,
}

impl<P, T> Clone for Query<P, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            fetcher: self.fetcher.clone(),
            state: self.state.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<P, T> Query<P, T>
where
    P: Serialize + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Cria a query sem buscar nada.
    pub fn new<F, Fut>(client: ApiClient, params: P, fetch: F) -> Self
    where
        F: Fn(ApiClient, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let fetcher: Fetcher<P, T> =
            Arc::new(move |client: ApiClient, params: P| fetch(client, params).boxed());
        Self {
            client,
            fetcher,
            state: Arc::new(RwLock::new(QueryState {
                params,
                data: None,
                loading: false,
                error: None,
            })),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn snapshot(&self) -> QueryState<P, T> {
        self.state.read().await.clone()
    }

    pub async fn data(&self) -> Option<T> {
        self.state.read().await.data.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Troca os parâmetros e busca.
    pub async fn start(&self, params: P) {
        // Geração e parâmetros mudam sob o mesmo lock
        let generation = {
            let mut state = self.state.write().await;
            state.params = params.clone();
            state.loading = true;
            state.error = None;
            self.next_generation()
        };
        self.run(generation, params).await;
    }

    /// Busca só se os parâmetros mudaram (comparados serializados).
    /// Devolve se houve nova busca.
    pub async fn set_params(&self, params: P) -> bool {
        let changed = {
            let state = self.state.read().await;
            !same_params(&state.params, &params)
        };
        if changed {
            self.start(params).await;
        } else {
            tracing::debug!("Parâmetros iguais, nada a buscar.");
        }
        changed
    }

    /// Repete a busca com os parâmetros atuais.
    pub async fn refetch(&self) {
        let (generation, params) = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            (self.next_generation(), state.params.clone())
        };
        self.run(generation, params).await;
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn run(&self, generation: u64, params: P) {
        let result = (self.fetcher)(self.client.clone(), params).await;

        let mut state = self.state.write().await;
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            tracing::debug!(
                "Resposta obsoleta descartada (geração {} < {}).",
                generation,
                latest
            );
            return;
        }
        match result {
            Ok(data) => {
                state.data = Some(data);
                state.error = None;
            }
            Err(e) => state.error = Some(e.to_string()),
        }
        state.loading = false;
    }
}

fn same_params<P: Serialize>(current: &P, next: &P) -> bool {
    match (serde_json::to_value(current), serde_json::to_value(next)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// --- Queries por recurso (já com a primeira busca feita) ---

pub async fn use_exercises(
    client: &ApiClient,
    filter: ExerciseFilter,
) -> Query<ExerciseFilter, Vec<Exercise>> {
    let query = Query::new(client.clone(), filter, |client, filter| async move {
        fitness::exercises::list(&client, &filter).await
    });
    query.refetch().await;
    query
}

pub async fn use_routines(
    client: &ApiClient,
    filter: RoutineFilter,
) -> Query<RoutineFilter, Vec<Routine>> {
    let query = Query::new(client.clone(), filter, |client, filter| async move {
        fitness::routines::list(&client, &filter).await
    });
    query.refetch().await;
    query
}

pub async fn use_progress(
    client: &ApiClient,
    filter: ProgressFilter,
) -> Query<ProgressFilter, Vec<ProgressLog>> {
    let query = Query::new(client.clone(), filter, |client, filter| async move {
        fitness::progress::list(&client, &filter).await
    });
    query.refetch().await;
    query
}

pub async fn use_recommendations(
    client: &ApiClient,
    filter: TrainerFilter,
) -> Query<TrainerFilter, Vec<TrainerRecommendation>> {
    let query = Query::new(client.clone(), filter, |client, filter| async move {
        fitness::recommendations::list(&client, &filter).await
    });
    query.refetch().await;
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::http::{testing::*, HttpMethod},
        models::fitness::ExerciseKind,
    };
    use serde_json::{json, Value};
    use std::time::Duration;

    fn exercise(id: &str, kind: &str) -> Value {
        json!({
            "id": id,
            "name": format!("Ejercicio {id}"),
            "type": kind,
            "created_at": "2024-11-01T10:00:00Z"
        })
    }

    fn by_kind(kind: ExerciseKind) -> ExerciseFilter {
        ExerciseFilter {
            kind: Some(kind),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn cardio_exercises_are_loaded() {
        let (client, transport) = mock_client();
        transport.reply(
            HttpMethod::Get,
            "/fitness/exercises/?type=cardio",
            200,
            json!([exercise("e1", "cardio")]),
        );

        let query = use_exercises(&client, by_kind(ExerciseKind::Cardio)).await;

        let state = query.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.error, None);
        let data = state.data.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].id, "e1");
        assert_eq!(data[0].kind, ExerciseKind::Cardio);
    }

    #[tokio::test]
    async fn unchanged_params_do_not_refetch() {
        let (client, transport) = mock_client();
        transport.reply(
            HttpMethod::Get,
            "/fitness/exercises/?type=cardio",
            200,
            json!([exercise("e1", "cardio")]),
        );
        transport.reply(
            HttpMethod::Get,
            "/fitness/exercises/?type=fuerza",
            200,
            json!([exercise("e2", "fuerza")]),
        );
        let query = use_exercises(&client, by_kind(ExerciseKind::Cardio)).await;

        assert!(!query.set_params(by_kind(ExerciseKind::Cardio)).await);
        assert_eq!(transport.requests().len(), 1);

        assert!(query.set_params(by_kind(ExerciseKind::Fuerza)).await);
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(query.data().await.unwrap()[0].id, "e2");
    }

    #[tokio::test]
    async fn refetch_repeats_the_request() {
        let (client, transport) = mock_client();
        transport.reply(HttpMethod::Get, "/fitness/routines/?user_id=juan.perez", 200, json!([]));
        let filter = RoutineFilter {
            user_id: Some("juan.perez".into()),
            ..Default::default()
        };
        let query = use_routines(&client, filter).await;
        query.refetch().await;

        assert_eq!(transport.requests().len(), 2);
        assert_eq!(query.data().await, Some(vec![]));
    }

    #[tokio::test]
    async fn failure_keeps_error_text() {
        let (client, transport) = mock_client();
        transport.reply(
            HttpMethod::Get,
            "/fitness/progress/?user_id=juan.perez",
            500,
            json!({"error": "Erro interno do servidor"}),
        );
        let filter = ProgressFilter {
            user_id: Some("juan.perez".into()),
            ..Default::default()
        };
        let query = use_progress(&client, filter).await;

        let state = query.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.data, None);
        assert!(state.error.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let (client, transport) = mock_client();
        transport.reply(HttpMethod::Get, "/fitness/exercises/", 200, json!([]));
        transport.reply_after(
            Duration::from_millis(50),
            HttpMethod::Get,
            "/fitness/exercises/?type=cardio",
            200,
            json!([exercise("lento", "cardio")]),
        );
        transport.reply(
            HttpMethod::Get,
            "/fitness/exercises/?type=fuerza",
            200,
            json!([exercise("rapido", "fuerza")]),
        );
        let query = use_exercises(&client, ExerciseFilter::default()).await;

        // A busca lenta começa primeiro e termina por último
        tokio::join!(
            query.start(by_kind(ExerciseKind::Cardio)),
            query.start(by_kind(ExerciseKind::Fuerza)),
        );

        let state = query.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.data.unwrap()[0].id, "rapido");
        assert_eq!(state.params, by_kind(ExerciseKind::Fuerza));
    }

    #[tokio::test]
    async fn recommendations_query_uses_trainer_filter() {
        let (client, transport) = mock_client();
        let filter = TrainerFilter {
            trainer_id: Some("carlos.trainer".into()),
            user_id: None,
        };
        let query = use_recommendations(&client, filter).await;

        assert_eq!(
            target_of(&single_request(&transport)),
            "/fitness/recommendations/?trainer_id=carlos.trainer"
        );
        assert!(query.error().await.is_some());
        assert!(!query.is_loading().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_starts_keep_params_and_data_together() {
        let (client, transport) = mock_client();
        transport.reply(HttpMethod::Get, "/fitness/exercises/", 200, json!([]));
        for kind in ["cardio", "fuerza", "movilidad"] {
            transport.reply(
                HttpMethod::Get,
                &format!("/fitness/exercises/?type={kind}"),
                200,
                json!([exercise(kind, kind)]),
            );
        }
        let query = use_exercises(&client, ExerciseFilter::default()).await;

        for _ in 0..20 {
            let handles: Vec<_> = ExerciseKind::ALL
                .into_iter()
                .map(|kind| {
                    let query = query.clone();
                    tokio::spawn(async move { query.start(by_kind(kind)).await })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap();
            }

            let state = query.snapshot().await;
            assert!(!state.loading);
            let data = state.data.unwrap();
            assert_eq!(Some(data[0].kind), state.params.kind);
        }
    }
}
