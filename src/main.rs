use dotenvy::dotenv;
use pharmacy_supply::config::AppConfig;
use pharmacy_supply::infrastructure::supplier_store::JsonSupplierOrderStore;
use pharmacy_supply::{build_server, create_pool, run_migrations, AppState};

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("invalid configuration", e))?;
    for term in config.pricing.discount_table.terms() {
        log::info!(
            "Contracts of {}+ months get {}% off",
            term.duration_months,
            term.discount_percent
        );
    }

    let pool = create_pool(&config.database_url)
        .map_err(|e| startup_error("failed to create database pool", e))?;
    run_migrations(&pool).map_err(|e| startup_error("failed to run migrations", e))?;

    let supplier_orders = JsonSupplierOrderStore::new(&config.supplier_orders_path);
    log::info!(
        "Supplier orders are kept in {}",
        supplier_orders.path().display()
    );
    let state = AppState::from_pool(pool, supplier_orders, config.pricing);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
