use super::resolve_paths;
use anyhow::Result;
use livedev_infrastructure::ConfigService;
use std::path::Path;

pub async fn show(home: Option<&Path>) -> Result<()> {
    let paths = resolve_paths(home)?;
    let config = ConfigService::new(paths.config_file()).get_config().await?;
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn path(home: Option<&Path>) -> Result<()> {
    let service = ConfigService::new(resolve_paths(home)?.config_file());
    println!("{}", service.path().display());
    Ok(())
}

pub async fn init(home: Option<&Path>) -> Result<()> {
    let service = ConfigService::new(resolve_paths(home)?.config_file());
    if service.init_default().await? {
        println!("📝 Wrote {}", service.path().display());
    } else {
        println!("Config already exists at {}", service.path().display());
    }
    Ok(())
}
