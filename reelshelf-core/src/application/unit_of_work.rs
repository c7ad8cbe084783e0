use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::PostgresDatabase;
use crate::database::infrastructure::postgres::{
    PostgresImportRepository, PostgresListsRepository, PostgresShareRegistry,
    PostgresStatsRepository, PostgresUsersRepository,
};
use crate::database::ports::{
    imports::ImportRepository, lists::ListsRepository, shares::ShareRegistry,
    stats::StatsRepository, users::UsersRepository,
};

/// Every repository port the services need, behind trait objects so tests
/// can swap in the in-memory store.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub users: Arc<dyn UsersRepository>,
    pub lists: Arc<dyn ListsRepository>,
    pub stats: Arc<dyn StatsRepository>,
    pub shares: Arc<dyn ShareRegistry>,
    pub imports: Arc<dyn ImportRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("lists", &type_name_of_val(self.lists.as_ref()))
            .field("stats", &type_name_of_val(self.stats.as_ref()))
            .field("shares", &type_name_of_val(self.shares.as_ref()))
            .field("imports", &type_name_of_val(self.imports.as_ref()))
            .finish()
    }
}

impl AppUnitOfWork {
    pub fn from_postgres(db: &PostgresDatabase) -> Self {
        let pool = db.pool().clone();
        Self {
            users: Arc::new(PostgresUsersRepository::new(pool.clone())),
            lists: Arc::new(PostgresListsRepository::new(pool.clone())),
            stats: Arc::new(PostgresStatsRepository::new(pool.clone())),
            shares: Arc::new(PostgresShareRegistry::new(pool.clone())),
            imports: Arc::new(PostgresImportRepository::new(pool)),
        }
    }
}
