use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    mailer::Mailer,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            pool,
            orm,
            config: Arc::new(config),
            mailer,
        }
    }
}
