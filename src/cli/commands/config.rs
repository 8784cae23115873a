use crate::config::Config;

pub fn cmd_config_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("✓ Created config.toml with default settings.");
        println!("Edit [tmdb] api_key before starting the server.");
    } else {
        println!("config.toml already exists, leaving it untouched.");
    }

    Ok(())
}

pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    let mut shown = config.clone();
    if !shown.tmdb.api_key.is_empty() {
        shown.tmdb.api_key = "<set>".to_string();
    }

    println!("{}", toml::to_string_pretty(&shown)?);

    Ok(())
}
