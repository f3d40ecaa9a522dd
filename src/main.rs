// src/main.rs
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wellness::{config::Config, db, seed, services::auth_service, state::AppState, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging (tracing) ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "wellness=debug,tower_http=info,sqlx=warn,tower_sessions=info".into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor de bem-estar...");

    let config = Config::from_env()?;

    // --- Base de dados ---
    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar a base de dados: {}", e);
            return Err(anyhow::anyhow!("Falha ao conectar/migrar DB: {}", e));
        }
    };

    if config.seed_demo_data {
        seed::seed_demo_data(&db_pool).await?;
        tracing::info!("🌱 Dados de demonstração verificados.");
    }

    // --- Sessões ---
    let session_store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("Falha ao criar session store: {}", e))?;
    session_store.migrate().await?;

    let cleanup_store = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = cleanup_store
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Erro na task de limpeza de sessões: {:?}", e);
        }
    });
    tokio::spawn(auth_service::continuously_purge_expired_tokens(
        db_pool.clone(),
        tokio::time::Duration::from_secs(60 * 60),
    ));
    tracing::info!("🧹 Tarefas de limpeza de sessões e tokens iniciadas.");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_signed(config.session_key()?)
        .with_secure(config.secure_cookies)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));
    tracing::info!("🔑 Camada de sessão configurada.");

    // --- Listener ---
    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao escutar em {}: {}", config.bind_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Servidor escutando em http://{}", config.bind_addr);

    // --- Router e middlewares ---
    let app = web::routes::create_router(AppState { db_pool }).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    );

    tracing::info!("👂 Servidor pronto para aceitar conexões...");
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}
