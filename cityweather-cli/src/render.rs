use cityweather_core::{DisplayModel, WeatherView};

/// Lay the view out as the widget would: temperature, emoji, description.
pub fn render_view(view: &WeatherView, fahrenheit: Option<&str>) -> String {
    let mut lines = vec![match fahrenheit {
        Some(f) if !view.is_error => format!("{} ({f})", view.temperature),
        _ => view.temperature.clone(),
    }];

    for field in [&view.emoji, &view.description] {
        if !field.is_empty() {
            lines.push(field.clone());
        }
    }

    lines.join("\n")
}

pub fn fahrenheit_of(model: Option<&DisplayModel>, wanted: bool) -> Option<&str> {
    model.filter(|_| wanted).map(|m| m.temperature_fahrenheit.as_str())
}
