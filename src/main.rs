//src/main.rs

use rrhh_backend::{
    config::{AppState, Config},
    MIGRATOR,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger; RUST_LOG ajusta o nível (padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    if config.run_migrations {
        MIGRATOR.run(&app_state.db_pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    let countries = app_state.catalog_service.list_countries().await?;
    let currencies = app_state.catalog_service.list_currencies().await?;
    tracing::info!(
        countries = countries.len(),
        currencies = currencies.len(),
        "🚀 Catálogos base disponíveis"
    );

    Ok(())
}
