use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::InquireError;

use skycast_core::{Config, Dashboard, OpenWeatherClient, icon_url};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API credential.
    Configure,

    /// Show current conditions and the daily forecast for a location.
    Show {
        /// City or town name.
        location: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { location }) => show(&location).await,
            // No subcommand: interactive search loop, the dashboard proper.
            None => interactive().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:")
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(location: &str) -> anyhow::Result<()> {
    let client = client_from_config()?;
    let dashboard = Dashboard::new();

    dashboard
        .refresh(&client, location)
        .await
        .with_context(|| format!("Could not fetch weather for '{location}'"))?;

    render(&dashboard);
    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let client = client_from_config()?;
    let dashboard = Dashboard::new();

    loop {
        let query = match inquire::Text::new("City or town (empty to quit):").prompt() {
            Ok(query) => query,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read location"),
        };

        if query.trim().is_empty() {
            break;
        }

        // A failed search keeps the previous result on screen.
        if let Err(err) = dashboard.refresh(&client, &query).await {
            eprintln!("Search failed: {err}");
        }
        render(&dashboard);
    }

    Ok(())
}

fn client_from_config() -> anyhow::Result<OpenWeatherClient> {
    let config = Config::load()?;
    let api_key = config.require_api_key()?.to_owned();

    let client = OpenWeatherClient::with_options(
        api_key,
        config.base_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )
    .context("Failed to build HTTP client")?;

    Ok(client)
}

fn render(dashboard: &Dashboard) {
    let Some(current) = dashboard.current() else {
        println!("No results yet.");
        return;
    };

    println!();
    println!("{}, {}", current.city, current.country);
    if let Some(local_time) = dashboard.local_time() {
        println!("{local_time}");
    }
    println!(
        "{:.1}\u{b0}C  {} ({})",
        current.temperature_c, current.condition, current.description
    );

    let daily = dashboard.daily();
    if !daily.is_empty() {
        println!();
        println!("Daily forecast:");
        for day in &daily {
            println!(
                "  {}  {:>5.1}\u{b0}C  {:<20}  {}",
                day.date.format("%a %b %-d"),
                day.avg_temp_c,
                day.description,
                icon_url(&day.icon)
            );
        }
    }
    println!();
}
