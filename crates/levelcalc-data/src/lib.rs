//! Levelcalc Data -- loads season cost sheets, material sources, time
//! presets and calculator configuration from a data directory.
//!
//! Cost sheets may be CSV exports (`level` plus `cost_<material>` columns)
//! or structured RON / TOML / JSON row lists. Tracks that cannot be loaded
//! fall back to built-in tables so a calculation can always run.

pub mod config;
pub mod fallback;
pub mod loader;
pub mod presets;
pub mod schema;
pub mod season;
pub mod sheet;

pub use config::load_config;
pub use loader::DataLoadError;
pub use presets::{load_presets, TimePreset};
pub use season::{load_season, SeasonData};
