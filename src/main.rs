use flashcards_app::server::{ServerError, config::Config, start_server};
use log::error;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;
    if let Err(err) = start_server(config).await {
        error!("Server stopped: {}", err);
        return Err(err);
    }
    Ok(())
}
