//! User account command handlers

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_user_add(config: &Config, username: &str) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() {
        println!("Username cannot be empty.");
        return Ok(());
    }

    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_some() {
        println!("User '{username}' already exists.");
        println!("Use 'watcharr user passwd {username}' to change the password.");
        return Ok(());
    }

    let Some(password) = prompt_password("Password for new account")? else {
        println!("Passwords did not match. No user created.");
        return Ok(());
    };

    if password.len() < 8 {
        println!("Password must be at least 8 characters. No user created.");
        return Ok(());
    }

    let user = store
        .create_user(username, &password, Some(&config.security))
        .await?;

    println!("✓ Created user: {}", user.username);
    println!("  API key: {}", user.api_key);

    Ok(())
}

pub async fn cmd_user_passwd(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_none() {
        println!("User '{username}' not found.");
        println!("Use 'watcharr user add {username}' to create the account.");
        return Ok(());
    }

    let Some(password) = prompt_password("New password")? else {
        println!("Passwords did not match. Password unchanged.");
        return Ok(());
    };

    if password.len() < 8 {
        println!("Password must be at least 8 characters. Password unchanged.");
        return Ok(());
    }

    store
        .update_user_password(username, &password, Some(&config.security))
        .await?;

    println!("✓ Password updated for {username}");

    Ok(())
}

pub async fn cmd_user_api_key(
    config: &Config,
    username: &str,
    regenerate: bool,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_none() {
        println!("User '{username}' not found.");
        return Ok(());
    }

    if regenerate {
        println!("Regenerate the API key for '{username}'? The old key stops working immediately.");
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }

        let api_key = store.regenerate_user_api_key(username).await?;
        println!("✓ New API key for {username}: {api_key}");
    } else if let Some(api_key) = store.get_user_api_key(username).await? {
        println!("API key for {username}: {api_key}");
    }

    Ok(())
}

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;

    print!("{prompt}: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_password(prompt: &str) -> anyhow::Result<Option<String>> {
    let first = prompt_line(prompt)?;
    let second = prompt_line("Repeat to confirm")?;
    Ok((first == second).then_some(first))
}
