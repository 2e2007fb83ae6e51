use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::query_planner::PlanError;
use crate::store::StoreError;

/// Any failure between loading a catalog and streaming its last row.
#[derive(Debug, Error)]
pub enum AnnographError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
