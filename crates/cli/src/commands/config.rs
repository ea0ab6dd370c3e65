use std::path::Path;

use eyre::Result;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub async fn handle_config_command(cmd: ConfigCommands, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(path).await?;
            config.set_value(&key, &value)?;
            config.save(path).await?;
            println!("Configuration updated: {key} = {value}");
        }
        ConfigCommands::Get { key } => {
            let config = Config::load(path).await?;
            println!("{key}: {}", config.get_value(&key)?);
        }
        ConfigCommands::Show => {
            let config = Config::load(path).await?;
            println!("{}", config.show_all());
        }
        ConfigCommands::Reset => {
            Config::reset(path).await?;
            println!("Configuration reset to defaults");
        }
    }

    Ok(())
}
