use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boss::HookError;
use boss::config::Config;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boss=info".into()),
        )
        // The output is relayed to the push client; no timestamps, always
        // colored even though stderr is a pipe.
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_ansi(true),
        )
        .init();

    if let Err(err) = deploy() {
        tracing::error!(error = %err, "deploy aborted");
        std::process::exit(1);
    }
}

fn deploy() -> Result<(), HookError> {
    let config = Config::load()?;
    let repo_dir = std::env::current_dir()?;
    boss::run(&config, &repo_dir, std::io::stdin().lock())
}
