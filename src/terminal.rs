//! Line-oriented host for the screen models.
//!
//! Plain text replaces the input field; lines starting with `:` are key
//! presses and button clicks. Model messages and stdin lines are handled on
//! one task, so models never see concurrent access.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use nimbus_ui::models::{AddFavoriteOutcome, CardState, ForecastStatus};
use nimbus_ui::{FavoritesModel, ForecastModel, Key, MessageReceiver, ScreenMessage, WeatherModel};
use nimbus_weather::TemperatureUnit;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
  <text>       type into the city field
  :down :up    move the suggestion highlight
  :enter       press Enter
  :esc         press Escape
  :pick N      click suggestion N (1-based)
  :blur        leave the field
  :outside     click outside the field
  :search      press the search button
  :unit c|f    show Celsius or Fahrenheit
  :fav         add the shown city to favorites
  :quit        exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(String),
    Key(Key),
    Pick(usize),
    Blur,
    Outside,
    Search,
    Unit(TemperatureUnit),
    Favorite,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Input(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    match (name, arg) {
        ("down", None) => Command::Key(Key::ArrowDown),
        ("up", None) => Command::Key(Key::ArrowUp),
        ("enter", None) => Command::Key(Key::Enter),
        ("esc", None) => Command::Key(Key::Escape),
        ("pick", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Pick(n - 1),
            _ => Command::Unknown(line.to_string()),
        },
        ("blur", None) => Command::Blur,
        ("outside", None) => Command::Outside,
        ("search", None) => Command::Search,
        ("unit", Some("c")) => Command::Unit(TemperatureUnit::Celsius),
        ("unit", Some("f")) => Command::Unit(TemperatureUnit::Fahrenheit),
        ("fav", None) => Command::Favorite,
        ("help", None) => Command::Help,
        ("quit", None) | ("q", None) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// A screen the terminal can drive.
pub trait Screen {
    /// Apply a user command; returns a one-line notice to print, if any.
    fn apply(&mut self, command: Command) -> Option<String>;
    fn handle(&mut self, msg: ScreenMessage);
    fn render(&self) -> String;
}

fn render_suggestions(out: &mut String, labels: &[String], highlighted: Option<usize>) {
    for (i, label) in labels.iter().enumerate() {
        let marker = if highlighted == Some(i) { '>' } else { ' ' };
        let _ = writeln!(out, "  {} {}. {}", marker, i + 1, label);
    }
}

impl Screen for WeatherModel {
    fn apply(&mut self, command: Command) -> Option<String> {
        match command {
            Command::Input(text) => self.set_input(&text),
            Command::Key(key) => {
                self.on_key(key);
            }
            Command::Pick(i) => self.pick(i),
            Command::Blur => self.on_blur(),
            Command::Outside => self.on_click_outside(),
            Command::Search => self.search(),
            Command::Unit(unit) => self.set_unit(unit),
            Command::Favorite => {
                return Some(match self.add_favorite() {
                    Ok(AddFavoriteOutcome::Added(city)) => format!("Added {} to favorites", city),
                    Ok(AddFavoriteOutcome::AlreadyPresent(city)) => {
                        format!("{} is already a favorite", city)
                    }
                    Ok(AddFavoriteOutcome::NothingToAdd) => "Search for a city first".to_string(),
                    Err(e) => e.user_message().to_string(),
                });
            }
            Command::Help | Command::Quit => {}
            Command::Unknown(line) => return Some(format!("Unknown command: {}", line)),
        }
        None
    }

    fn handle(&mut self, msg: ScreenMessage) {
        WeatherModel::handle(self, msg);
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let display = self.display();
        let _ = writeln!(out, "[{}]", self.input());
        render_suggestions(
            &mut out,
            &self.autocomplete().labels(),
            self.autocomplete().highlighted(),
        );
        if self.loading() {
            let _ = writeln!(out, "Loading...");
        }
        if !display.city.is_empty() {
            let _ = writeln!(out, "{}", display.city);
        }
        let _ = writeln!(out, "{}", display.temperature);
        if !display.description.is_empty() {
            let _ = writeln!(out, "{}", display.description);
        }
        if let Some(icon) = &display.icon_url {
            let _ = writeln!(out, "icon: {}", icon);
        }
        out
    }
}

impl Screen for ForecastModel {
    fn apply(&mut self, command: Command) -> Option<String> {
        match command {
            Command::Input(text) => self.set_input(&text),
            Command::Key(key) => {
                self.on_key(key);
            }
            Command::Pick(i) => self.pick(i),
            Command::Blur => self.on_blur(),
            Command::Outside => self.on_click_outside(),
            Command::Search => self.search(),
            Command::Unit(unit) => self.set_unit(unit),
            Command::Favorite => {
                return Some("Favorites are added from the weather screen".to_string())
            }
            Command::Help | Command::Quit => {}
            Command::Unknown(line) => return Some(format!("Unknown command: {}", line)),
        }
        None
    }

    fn handle(&mut self, msg: ScreenMessage) {
        ForecastModel::handle(self, msg);
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let display = self.display();
        let _ = writeln!(out, "[{}]", self.input());
        render_suggestions(
            &mut out,
            &self.autocomplete().labels(),
            self.autocomplete().highlighted(),
        );
        if let Some(error) = &display.error {
            let _ = writeln!(out, "! {}", error);
        }
        if display.status == ForecastStatus::Loading {
            let _ = writeln!(out, "Loading...");
        }
        if let Some(header) = &display.header {
            let _ = writeln!(out, "== {} ==", header);
        }
        for card in &display.cards {
            let _ = writeln!(out, "{:<10} {}", card.day, card.summary);
        }
        if let Some(message) = &display.empty_message {
            let _ = writeln!(out, "{}", message);
        }
        out
    }
}

/// Run an interactive screen until `:quit` or end of input.
pub async fn run<S: Screen>(mut screen: S, mut rx: MessageReceiver) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type a city, or :help");
    print!("{}", screen.render());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                let command = parse_line(line.trim_end());
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{}", HELP),
                    command => {
                        if let Some(notice) = screen.apply(command) {
                            println!("{}", notice);
                        }
                    }
                }
                print!("{}", screen.render());
            }
            Some(msg) = rx.recv() => {
                screen.handle(msg);
                print!("{}", screen.render());
            }
        }
    }

    tracing::debug!("Interactive session ended");
    Ok(())
}

/// Wait for every card, then print the ones that loaded.
pub async fn show_favorites(mut screen: FavoritesModel, mut rx: MessageReceiver) -> Result<()> {
    while screen.pending() > 0 {
        match rx.recv().await {
            Some(msg) => screen.handle(msg),
            None => break,
        }
    }

    if screen.favorites().is_empty() {
        println!("No favorites yet");
    }
    for card in screen.visible_cards() {
        if let CardState::Ready {
            summary,
            band,
            icon_url,
            ..
        } = &card.state
        {
            let icon = icon_url.as_deref().unwrap_or_default();
            println!("{:<24} {:<28} [{}] {}", card.city, summary, band.as_str(), icon);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_input() {
        assert_eq!(parse_line("new york"), Command::Input("new york".into()));
        assert_eq!(parse_line(""), Command::Input(String::new()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_line(":down"), Command::Key(Key::ArrowDown));
        assert_eq!(parse_line(":enter"), Command::Key(Key::Enter));
        assert_eq!(parse_line(":pick 2"), Command::Pick(1));
        assert_eq!(
            parse_line(":unit f"),
            Command::Unit(TemperatureUnit::Fahrenheit)
        );
        assert_eq!(parse_line(":quit"), Command::Quit);
    }

    #[test]
    fn test_bad_commands_are_unknown() {
        assert!(matches!(parse_line(":pick 0"), Command::Unknown(_)));
        assert!(matches!(parse_line(":pick x"), Command::Unknown(_)));
        assert!(matches!(parse_line(":unit k"), Command::Unknown(_)));
        assert!(matches!(parse_line(":dance"), Command::Unknown(_)));
    }
}
