//! Scenario-definition compiler for Victoria 2 style game data.
//!
//! Script files are read through [`v2txt`] and committed into a
//! [`context::GameState`]: interned text, modifiers, national identities,
//! political parties and unit types. Problems in the data never abort a
//! load; they accumulate in a [`diagnostics::Diagnostics`] log.

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod loader;
pub mod modifiers;
pub mod nations;
pub mod path;
pub mod static_modifiers;
pub mod text;
pub mod triggered;
pub mod world;

pub use config::LoadConfig;
pub use context::{GameState, ScenarioBuildingContext};
pub use diagnostics::Diagnostics;
pub use loader::{LoadError, LoadReport, load_scenario};
pub use text::{TextKey, TextPool};
