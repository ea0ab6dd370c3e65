mod cli;
mod commands;
mod config;

use std::path::PathBuf;

use clap::Parser;

use crate::cli::Commands;
use crate::commands::Context;
use crate::config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path = cli.config.unwrap_or_else(Config::get_config_path);

    if let Commands::Config { command } = cli.command {
        return commands::handle_config_command(command, &config_path).await;
    }

    let config = Config::load(&config_path).await?;
    let context = Context::new(&config)?;

    let result = match cli.command {
        Commands::Modules => {
            commands::modules::handle_modules_command(&context);
            Ok(())
        }
        Commands::Info { url, module, json } => {
            commands::info::handle_info_command(&context, &url, module, json).await
        }
        Commands::Chapter { id, module, json } => {
            commands::chapter::handle_chapter_command(&context, &id, module, json).await
        }
        Commands::Download { id, module, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.output.dir));
            commands::download::handle_download_command(&context, &id, module, &output).await
        }
        Commands::Config { .. } => Ok(()),
    };

    context.close().await;
    result
}
