use std::sync::Arc;

use chrono::FixedOffset;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub offset: FixedOffset,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> anyhow::Result<Self> {
        let offset = config.business_offset()?;
        Ok(Self {
            orm: create_orm_conn(&pool),
            pool,
            config: Arc::new(config),
            offset,
        })
    }

    /// Today's date in the business timezone.
    pub fn today(&self) -> chrono::NaiveDate {
        crate::domain::cash::local_date(chrono::Utc::now(), self.offset)
    }
}
