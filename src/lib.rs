//! Local Library catalog
//!
//! Data model for a small library: books, authors, genres, languages and
//! physical book copies, with the integrity rules the PostgreSQL schema
//! enforces and the list/detail data an admin-facing view layer consumes.

use std::sync::Arc;

use sqlx::{migrate::Migrator, postgres::PgPoolOptions};

pub mod admin;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use services::Services;

/// Catalog schema, applied on connect
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Catalog state shared with the presentation layer
#[derive(Clone)]
pub struct Catalog {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
}

impl Catalog {
    /// Connect to the store, apply the schema and wire the services
    pub async fn connect(config: AppConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect(&config.database.url)
            .await?;

        tracing::info!("Connected to database");

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(sqlx::Error::Migrate(Box::new(e))))?;

        tracing::info!("Catalog schema up to date");

        let services = Services::new(Arc::new(Repository::new(pool)), config.admin.clone())?;

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }

    /// Load `.env` and configuration, install logging, then connect
    pub async fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let config = AppConfig::load()?;
        logging::init(&config.logging)?;
        tracing::info!("Starting Local Library catalog v{}", env!("CARGO_PKG_VERSION"));
        Self::connect(config).await
    }
}
