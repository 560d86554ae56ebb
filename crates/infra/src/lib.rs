mod config;
mod repos;
mod services;
mod system;

pub use config::{default_reminder_grace, Config};
pub use repos::*;
pub use services::*;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;

#[derive(Clone)]
pub struct NotifierContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub transport: Arc<dyn ITransport>,
}

struct ContextParams {
    pub postgres_connection_string: String,
    pub telegram_api_url: String,
    pub telegram_bot_token: String,
}

impl NotifierContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(&params.postgres_connection_string).await?;
        Ok(Self {
            repos,
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            transport: Arc::new(TelegramTransport::new(
                params.telegram_api_url,
                params.telegram_bot_token,
            )),
        })
    }

    /// Context with inmemory repositories and transport, used for testing
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            transport: Arc::new(InMemoryTransport::new()),
        }
    }
}

fn get_env_var(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("{} env var to be present.", key))
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<NotifierContext> {
    const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

    NotifierContext::create(ContextParams {
        postgres_connection_string: get_env_var("DATABASE_URL")?,
        telegram_api_url: std::env::var("TELEGRAM_API_URL")
            .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.into()),
        telegram_bot_token: get_env_var("TELEGRAM_BOT_TOKEN")?,
    })
    .await
}
