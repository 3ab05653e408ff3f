use acad_resources::config::ServiceConfig;
use acad_resources::connection::{open_db_pool, run_migrations};
use acad_resources::course_seed::seed_courses_if_empty;
use acad_resources::logging::init_logging;
use acad_resources::routes::{router, AppState};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    init_logging(&config.log_level);

    let pool = open_db_pool(&config.database_url, config.pool_size)?;
    run_migrations(&pool).await?;

    // Seed courses if table is empty
    if let Some(path) = &config.courses_json_path {
        if let Err(e) = seed_courses_if_empty(&pool, path).await {
            warn!(error = %e, "failed to seed courses");
        }
    }

    let mut app = router(AppState { pool }).layer(TraceLayer::new_for_http());

    if config.local_dev_deployment {
        info!("local dev deployment, allowing any origin");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any);
        app = app.layer(cors);
    }

    info!(addr = %config.bind_addr, "starting resource service");
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("resource service stopped");
    Ok(())
}
