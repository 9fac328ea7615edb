use academic_muse_core::{KvStore, Settings};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Use the dark theme
    Dark,
    /// Use the light theme
    Light,
}

fn name(dark: bool) -> &'static str {
    if dark {
        "dark"
    } else {
        "light"
    }
}

pub fn run(action: ThemeAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    let mut settings = Settings::load(&store)?;

    match action {
        ThemeAction::Show => {}
        ThemeAction::Toggle => {
            settings.toggle_theme(&store)?;
        }
        ThemeAction::Dark => settings.set_dark_mode(&store, true)?,
        ThemeAction::Light => settings.set_dark_mode(&store, false)?,
    }
    println!("{}", name(settings.dark_mode));
    Ok(())
}
