//! Persisted voice preferences: audio devices and screen-share quality.

mod store;


pub use store::{PersistedSettings, SettingsStore};
