//! Business logic services

pub mod catalog;

use std::sync::Arc;

use crate::{admin::AdminSite, error::AppResult, repository::CatalogStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub admin: Arc<AdminSite>,
}

impl Services {
    /// Create all services over the given store; the admin site is validated first
    pub fn new(store: Arc<dyn CatalogStore>, admin: AdminSite) -> AppResult<Self> {
        admin.validate()?;
        Ok(Self {
            catalog: catalog::CatalogService::new(store),
            admin: Arc::new(admin),
        })
    }
}
