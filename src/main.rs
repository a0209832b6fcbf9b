mod console;

use marquee::assembly::Assembly;
use marquee::config::{self, Config};
use std::fs::File;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to a file so stdout stays readable
    let log_file = File::create(std::env::temp_dir().join("marquee.log")).ok();

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(false)
            .with_writer(file)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_target(false)
            .init();
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            if let config::ConfigError::NotFound(path) = &e {
                eprintln!("\nCreate a config file at: {}", path.display());
                eprintln!("\nExample config.toml:");
                eprintln!(
                    r#"
[tmdb]
apikey = "your-api-key"

[catalog]
aggregation = "all-or-nothing"

[player]
sample_url = "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8"
"#
                );
            }
            std::process::exit(1);
        }
    };

    let Some(assembly) = Assembly::new(config) else {
        eprintln!("No TMDB API key: set tmdb.apikey in the config file");
        std::process::exit(1);
    };

    if let Err(e) = console::run(&assembly).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
