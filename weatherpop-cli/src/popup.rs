//! The interactive popup session: a terminal rendering of the four panels
//! plus an action menu driving the controller.

use std::sync::Arc;

use inquire::{InquireError, Select, Text};
use weatherpop_core::{
    Config, IpLocationProvider, OpenWeatherClient, PopupController, PopupView, Storage, Units,
    WeatherObservation, icon_url,
};

/// Renders each panel as a block of terminal output. Printing a panel
/// naturally replaces the previous one, so exactly one is ever current.
#[derive(Debug, Default)]
pub struct TerminalView;

impl PopupView for TerminalView {
    fn show_idle(&mut self) {}

    fn show_loading(&mut self) {
        println!("Fetching weather...");
    }

    fn show_result(&mut self, data: &WeatherObservation, units: Units) {
        println!();
        println!("  {}, {}", data.name, data.country);
        println!("  {:.0}{}  {}", data.temperature, units.temp_label(), capitalize(&data.condition));
        println!("  Humidity: {}%", data.humidity);
        println!("  Wind: {:.1} {}", data.wind_speed, units.wind_label());
        if !data.icon.is_empty() {
            println!("  Icon: {}", icon_url(&data.icon));
        }
        println!();
    }

    fn show_error(&mut self, message: &str) {
        println!();
        println!("  {message}");
        println!();
    }

    fn set_input(&mut self, _text: &str) {
        // The controller owns the field text; the prompt reads it back on
        // the next search.
    }

    fn set_units_label(&mut self, _units: Units) {
        // The menu rebuilds its toggle entry from the controller each turn.
    }
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    let api_key = config.require_api_key()?.to_owned();

    let storage = Arc::new(Storage::open());
    let mut controller = PopupController::new(
        Box::new(OpenWeatherClient::new(api_key)),
        Box::new(IpLocationProvider::new()),
        storage,
        TerminalView,
    );
    controller.startup().await;

    loop {
        let toggle = format!("Switch to {}", controller.units().toggle_label());
        let options = vec![
            "Search by city".to_string(),
            "Use current location".to_string(),
            toggle,
            "Quit".to_string(),
        ];

        let choice = match Select::new("Weather popup", options).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match choice.as_str() {
            "Search by city" => {
                let text = match Text::new("City:")
                    .with_initial_value(controller.input())
                    .prompt()
                {
                    Ok(text) => text,
                    Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                controller.submit_city(&text).await;
            }
            "Use current location" => controller.use_current_location().await,
            "Quit" => break,
            _ => controller.toggle_units().await,
        }
    }

    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_uppercases_only_the_first_letter() {
        assert_eq!(capitalize("clear sky"), "Clear sky");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("Rain"), "Rain");
    }
}
