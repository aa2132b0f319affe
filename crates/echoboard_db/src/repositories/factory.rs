//! Factory for creating SQL repositories from a shared database client

use crate::repositories::{
    SqlAudienceRepository, SqlDeliveryLogRepository, SqlDeviceTokenRepository,
};
use crate::{DbClient, RepositoryFactory};

/// Builds every SQL repository of this crate.
#[derive(Debug, Clone, Default)]
pub struct SqlRepositoryFactory;

impl SqlRepositoryFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlDeviceTokenRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlDeviceTokenRepository {
        SqlDeviceTokenRepository::new(db_client)
    }
}

impl RepositoryFactory<SqlDeliveryLogRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlDeliveryLogRepository {
        SqlDeliveryLogRepository::new(db_client)
    }
}

impl RepositoryFactory<SqlAudienceRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlAudienceRepository {
        SqlAudienceRepository::new(db_client)
    }
}
