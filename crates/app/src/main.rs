use clap::Parser;

mod commands;
mod config;
mod error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = config::Args::parse();
    let settings = config::load(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "mindframe={level},tracker={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(base_url = %settings.base_url, "loaded settings");
    commands::run(args.command, &settings).await?;
    Ok(())
}
