//! Welcome and goodbye message templates.
//!
//! `welcome.json` carries three template lists; one is picked at
//! random per membership event. Supported fillings: `{name}`,
//! `{username}`, `{group}`, `{id}`.
//!
//! ```json
//! {
//!     "group": ["🎉 Welcome to {group}, {name}!"],
//!     "private": ["👋 Welcome {name}!"],
//!     "goodbye": ["👋 Goodbye, {name}."]
//! }
//! ```
//!
//! An empty list disables the corresponding dispatch.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::load_json;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WelcomeTemplates {
    #[serde(default)]
    pub group: Vec<String>,

    #[serde(default)]
    pub private: Vec<String>,

    #[serde(default)]
    pub goodbye: Vec<String>,
}

impl WelcomeTemplates {
    /// Load the templates, degrading to empty lists on any error.
    pub fn load(path: &Path) -> Self {
        match load_json::<Self>(path) {
            Ok(templates) => templates,
            Err(e) => {
                warn!("welcome templates unavailable, welcomes disabled: {e}");
                Self::default()
            }
        }
    }
}
