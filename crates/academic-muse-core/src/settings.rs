//! Process-wide UI flags mirrored to the store: the theme and whether the
//! about screen has been shown.

use serde::Serialize;

use crate::error::CoreError;
use crate::storage::{keys, KvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub seen_about: bool,
}

impl Settings {
    pub fn load(store: &KvStore) -> Result<Self, CoreError> {
        Ok(Self {
            dark_mode: store.get_json::<bool>(keys::DARK_MODE)?.unwrap_or(false),
            seen_about: store.get(keys::SEEN_ABOUT)?.as_deref() == Some("true"),
        })
    }

    pub fn set_dark_mode(&mut self, store: &KvStore, on: bool) -> Result<(), CoreError> {
        store.set_json(keys::DARK_MODE, &on)?;
        self.dark_mode = on;
        Ok(())
    }

    /// Flip the theme and return the new value.
    pub fn toggle_theme(&mut self, store: &KvStore) -> Result<bool, CoreError> {
        self.set_dark_mode(store, !self.dark_mode)?;
        Ok(self.dark_mode)
    }

    /// Record that the about screen was shown. Returns true the first time.
    pub fn mark_about_seen(&mut self, store: &KvStore) -> Result<bool, CoreError> {
        if self.seen_about {
            return Ok(false);
        }
        store.set(keys::SEEN_ABOUT, "true")?;
        self.seen_about = true;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_light_and_unseen() {
        let store = KvStore::open_memory().unwrap();
        assert_eq!(Settings::load(&store).unwrap(), Settings::default());
    }

    #[test]
    fn toggle_persists() {
        let store = KvStore::open_memory().unwrap();
        let mut s = Settings::load(&store).unwrap();
        assert!(s.toggle_theme(&store).unwrap());
        assert_eq!(store.get(keys::DARK_MODE).unwrap().as_deref(), Some("true"));
        assert!(Settings::load(&store).unwrap().dark_mode);
        assert!(!s.toggle_theme(&store).unwrap());
        assert!(!Settings::load(&store).unwrap().dark_mode);
    }

    #[test]
    fn about_is_seen_once() {
        let store = KvStore::open_memory().unwrap();
        let mut s = Settings::load(&store).unwrap();
        assert!(s.mark_about_seen(&store).unwrap());
        assert!(!s.mark_about_seen(&store).unwrap());
        assert!(Settings::load(&store).unwrap().seen_about);
    }
}
