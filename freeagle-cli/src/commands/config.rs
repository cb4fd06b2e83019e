use anyhow::Result;
use freeagle_core::config::FreeagleConfig;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let config_path = FreeagleConfig::config_path()?;
    let config = FreeagleConfig::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Data:    {}", config.data_path().display());
    println!();
    println!("{}", "Server".bold());
    println!("  URL:     {}", config.api_url);
    println!("  Timeout: {}s", config.request_timeout_secs);
    println!("  Share:   {:?}", config.share_order);

    Ok(())
}
