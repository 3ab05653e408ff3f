use acad_resources::bot::backend::HttpResourceApi;
use acad_resources::bot::conversation::Conversation;
use acad_resources::bot::runner::run_polling;
use acad_resources::bot::telegram::TelegramPlatform;
use acad_resources::config::BotConfig;
use acad_resources::logging::init_logging;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BotConfig::from_env()?;
    init_logging(&config.log_level);
    info!(backend = %config.backend_base_url, "starting resource bot");

    let telegram = TelegramPlatform::new(&config.telegram_api_url, &config.bot_token, config.poll_timeout);
    let api = HttpResourceApi::new(&config.backend_base_url)?;
    let conversation = Conversation::new(telegram.clone(), api);

    run_polling(telegram, conversation).await;
    Ok(())
}
