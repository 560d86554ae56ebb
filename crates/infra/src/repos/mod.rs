mod recipient;
mod reminder_ledger;
mod shared;
mod task;
mod user_settings;

pub use recipient::{IRecipientRepo, InMemoryRecipientRepo, PostgresRecipientRepo};
pub use reminder_ledger::{
    IReminderLedgerRepo, InMemoryReminderLedgerRepo, PostgresReminderLedgerRepo,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use task::{ITaskRepo, InMemoryTaskRepo, PostgresTaskRepo, ReminderCheckQuery};
use tracing::info;
pub use user_settings::{IUserSettingsRepo, InMemoryUserSettingsRepo, PostgresUserSettingsRepo};

#[derive(Clone)]
pub struct Repos {
    pub tasks: Arc<dyn ITaskRepo>,
    pub reminder_ledger: Arc<dyn IReminderLedgerRepo>,
    pub user_settings: Arc<dyn IUserSettingsRepo>,
    pub recipients: Arc<dyn IRecipientRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        info!("DB RUNNING MIGRATIONS ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB RUNNING MIGRATIONS ... [done]");

        Ok(Self {
            tasks: Arc::new(PostgresTaskRepo::new(pool.clone())),
            reminder_ledger: Arc::new(PostgresReminderLedgerRepo::new(pool.clone())),
            user_settings: Arc::new(PostgresUserSettingsRepo::new(pool.clone())),
            recipients: Arc::new(PostgresRecipientRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            tasks: Arc::new(InMemoryTaskRepo::new()),
            reminder_ledger: Arc::new(InMemoryReminderLedgerRepo::new()),
            user_settings: Arc::new(InMemoryUserSettingsRepo::new()),
            recipients: Arc::new(InMemoryRecipientRepo::new()),
        }
    }
}
