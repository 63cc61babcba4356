//! Core library for the `cityweather` tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather current-weather client and its failure classification
//! - Presentation of results and failures as display text
//!
//! It is used by `cityweather-cli`, but has no terminal dependencies and can back
//! any other front end.

pub mod client;
pub mod condition;
pub mod config;
pub mod failure;
pub mod model;
pub mod presenter;

pub use client::OpenWeatherClient;
pub use condition::ConditionCategory;
pub use config::Config;
pub use failure::WeatherFailure;
pub use model::{WeatherQuery, WeatherResult};
pub use presenter::{DisplayModel, WeatherView, describe_error, present};
