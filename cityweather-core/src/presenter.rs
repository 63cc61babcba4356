//! Turns fetch outcomes into the text shown in the three output fields.

use crate::{condition::ConditionCategory, failure::WeatherFailure, model::WeatherResult};

const ABSOLUTE_ZERO_C: f64 = 273.15;

/// Display fields derived from a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModel {
    /// Whole degrees Celsius, e.g. `15°C`.
    pub temperature: String,
    /// Whole degrees Fahrenheit, e.g. `59°F`. Not shown unless asked for.
    pub temperature_fahrenheit: String,
    pub description: String,
    pub emoji: &'static str,
    pub category: ConditionCategory,
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - ABSOLUTE_ZERO_C
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin * 9.0 / 5.0 - 459.67
}

/// Round to the nearest whole degree, ties to even, and append `unit`.
pub fn format_degrees(value: f64, unit: char) -> String {
    // Rounding through i64 avoids printing "-0".
    format!("{}°{unit}", value.round_ties_even() as i64)
}

pub fn present(result: &WeatherResult) -> DisplayModel {
    let category = ConditionCategory::from_id(result.condition_id);

    DisplayModel {
        temperature: format_degrees(kelvin_to_celsius(result.temperature_kelvin), 'C'),
        temperature_fahrenheit: format_degrees(kelvin_to_fahrenheit(result.temperature_kelvin), 'F'),
        description: result.condition_description.clone(),
        emoji: category.glyph(),
        category,
    }
}

/// Two-line message: a summary, then what the user can do about it.
pub fn describe_error(failure: &WeatherFailure) -> String {
    match failure {
        WeatherFailure::BadRequest => "Bad request:\nPlease check your input".to_string(),
        WeatherFailure::Unauthorized => "Unauthorized:\nInvalid API key".to_string(),
        WeatherFailure::Forbidden => "Forbidden:\nAccess denied".to_string(),
        WeatherFailure::NotFound => "Not Found:\ncity is not found".to_string(),
        WeatherFailure::ServerError { code: 503 } => "Server unavailable:\nServer is down".to_string(),
        WeatherFailure::ServerError { .. } => {
            "Internal server error:\nPlease try again later".to_string()
        }
        WeatherFailure::GatewayError { code: 504 } => {
            "Gateway timeout:\nNo response from the server".to_string()
        }
        WeatherFailure::GatewayError { .. } => {
            "Bad gateway:\nInvalid response from the server".to_string()
        }
        WeatherFailure::ConnectionError => {
            "Connection Error:\ncheck your internet connection".to_string()
        }
        WeatherFailure::Timeout => "Timeout error:\nThe request timed out".to_string(),
        WeatherFailure::TooManyRedirects => "Too many redirects:\ncheck URL".to_string(),
        WeatherFailure::OtherHttpError { message, .. } => {
            format!("HTTP error occurred:\n{message}")
        }
        WeatherFailure::OtherRequestError(message) => format!("Request Error:\n{message}"),
    }
}

/// State of the three output labels.
///
/// Owned by the front end and updated only through [`WeatherView::apply`] and
/// friends, so an error can never leave a stale emoji or description behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherView {
    pub temperature: String,
    pub emoji: String,
    pub description: String,
    pub is_error: bool,
}

impl WeatherView {
    pub fn show_weather(&mut self, model: &DisplayModel) {
        self.temperature = model.temperature.clone();
        self.emoji = model.emoji.to_string();
        self.description = model.description.clone();
        self.is_error = false;
    }

    /// The message takes the temperature slot; emoji and description are cleared.
    pub fn show_error(&mut self, failure: &WeatherFailure) {
        self.temperature = describe_error(failure);
        self.emoji.clear();
        self.description.clear();
        self.is_error = true;
    }

    pub fn apply(&mut self, outcome: &Result<WeatherResult, WeatherFailure>) {
        match outcome {
            Ok(result) => self.show_weather(&present(result)),
            Err(failure) => self.show_error(failure),
        }
    }
}
