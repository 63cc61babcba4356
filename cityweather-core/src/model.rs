/// A single user query: the city name exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city_name: String,
}

impl WeatherQuery {
    pub fn new(city_name: impl Into<String>) -> Self {
        Self { city_name: city_name.into() }
    }
}

/// Current conditions as reported by the provider, before any presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherResult {
    pub temperature_kelvin: f64,
    pub condition_id: i64,
    pub condition_description: String,
}
