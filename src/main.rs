use empire::server::{
    config::Config, credential::CredentialRegistry, error::Error, logging::init_logging, router,
    scheduler::cron::start_scheduler, startup,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(config.log_format);

    if let Err(e) = run(config).await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let profiles = config.load_entities()?;
    let credentials = CredentialRegistry::from_env(&profiles);
    tracing::info!(
        "Loaded {} entities, {} with provider credentials",
        profiles.len(),
        credentials.len()
    );

    let db = startup::connect_to_database(&config).await?;
    startup::prepare_store(&db, &profiles).await?;

    let client = startup::build_mercury_client(&config)?;
    let state = startup::build_app_state(&config, db, client, credentials);
    let _alerts = startup::spawn_alert_logger(&state.coordinator);
    let _scheduler = start_scheduler(&config.sync_cron, &state.coordinator).await?;

    let app = router::routes().with_state(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    tracing::info!("Starting server on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
