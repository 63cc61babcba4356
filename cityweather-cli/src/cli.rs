use anyhow::Context;
use clap::{Parser, Subcommand};
use cityweather_core::{Config, OpenWeatherClient, WeatherView, present};
use inquire::{Password, PasswordDisplayMode, Text, error::InquireError};
use tracing::info;

use crate::render::{fahrenheit_of, render_view};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, passed to the provider as typed.
        city: String,

        /// Also show the temperature in Fahrenheit.
        #[arg(long)]
        fahrenheit: bool,
    },

    /// Prompt for cities repeatedly until an empty line.
    Interactive {
        /// Also show the temperature in Fahrenheit.
        #[arg(long)]
        fahrenheit: bool,
    },

    /// Print the location of the config file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show { city, fahrenheit } => {
                let client = client_from_env()?;
                let mut view = WeatherView::default();
                println!("{}", lookup(&client, &mut view, &city, fahrenheit).await);
            }
            Command::Interactive { fahrenheit } => {
                let client = client_from_env()?;
                interactive(&client, fahrenheit).await?;
            }
            Command::ConfigPath => println!("{}", Config::config_file_path()?.display()),
        }

        Ok(())
    }
}

fn client_from_env() -> anyhow::Result<OpenWeatherClient> {
    let config = Config::load_with_env()?;
    OpenWeatherClient::from_config(&config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.require_api_key()?;
    config.save()?;

    let path = Config::config_file_path()?;
    info!(path = %path.display(), "saved configuration");
    println!("Saved API key to {}", path.display());
    Ok(())
}

/// One fetch, applied to `view`, rendered as text. Failures are rendered, not returned.
async fn lookup(
    client: &OpenWeatherClient,
    view: &mut WeatherView,
    city: &str,
    fahrenheit: bool,
) -> String {
    let outcome = client.fetch(city).await;
    view.apply(&outcome);

    let model = outcome.as_ref().ok().map(present);
    render_view(view, fahrenheit_of(model.as_ref(), fahrenheit))
}

async fn interactive(client: &OpenWeatherClient, fahrenheit: bool) -> anyhow::Result<()> {
    let mut view = WeatherView::default();

    loop {
        let city = match Text::new("Enter city name:").prompt() {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city name"),
        };

        if city.trim().is_empty() {
            break;
        }

        println!("{}\n", lookup(client, &mut view, &city, fahrenheit).await);
    }

    Ok(())
}
