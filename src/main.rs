//! Entry point for the heartwise prediction server.
use heartwise::config::ServerConfig;
use heartwise::inference::Predictor;
use heartwise::{logging, server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = logging::init(&config.log_dir) {
        eprintln!("Logging disabled: {err}");
    }

    let predictor = match Predictor::load(&config.model_path) {
        Ok(predictor) => predictor,
        Err(err) => {
            tracing::error!("Failed to load model: {err}");
            eprintln!("Failed to load model: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Loaded {} pipeline from {}",
        predictor.pipeline().classifier.name(),
        config.model_path.display()
    );

    server::run(config, predictor).await
}
