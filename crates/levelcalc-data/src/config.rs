//! Calculator configuration file (`config.ron` / `.toml` / `.json`).

use std::path::Path;

use levelcalc_core::plan::CalculatorConfig;

use crate::loader::{deserialize_file, find_data_file, DataLoadError};

pub const CONFIG_FILE: &str = "config";

/// Load `config.*` from `dir`. A missing file yields the defaults; every
/// field left out of the file keeps its default too.
pub fn load_config(dir: &Path) -> Result<CalculatorConfig, DataLoadError> {
    match find_data_file(dir, CONFIG_FILE)? {
        Some(path) => {
            let config: CalculatorConfig = deserialize_file(&path)?;
            tracing::debug!(
                file = %path.display(),
                seasons = config.seasons.len(),
                slots = config.slots.len(),
                "loaded calculator config"
            );
            Ok(config)
        }
        None => Ok(CalculatorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{cleanup, make_test_dir};
    use levelcalc_core::track::TargetGroup;
    use std::fs;

    #[test]
    fn absent_config_is_default() {
        let dir = make_test_dir("config_absent");
        assert_eq!(load_config(&dir).unwrap(), CalculatorConfig::default());
        cleanup(&dir);
    }

    #[test]
    fn ron_config_with_season() {
        let dir = make_test_dir("config_ron");
        fs::write(
            dir.join("config.ron"),
            r#"(
    relic_total: 20,
    speed_up_hours: 3,
    seasons: [
        (
            season: "s1",
            base_level: 100,
            weights: (
                character: 100,
                equipment_resonance: 190,
                skill_resonance: 112,
                pet_resonance: 56,
                relic_resonance: 1140,
            ),
            star_divisor: 100,
            star_offset: 10,
        ),
    ],
)"#,
        )
        .unwrap();

        let config = load_config(&dir).unwrap();
        assert_eq!(config.speed_up_hours, 3);
        assert_eq!(config.max_level, 200);
        let s1 = config.season("s1").unwrap();
        assert_eq!(s1.weights.get(TargetGroup::RelicResonance), 1140);
        assert_eq!(s1.relic_level_divisor, 10);
        cleanup(&dir);
    }

    #[test]
    fn toml_config_overrides_limits() {
        let dir = make_test_dir("config_toml");
        fs::write(dir.join("config.toml"), "max_level = 150\nrelic_tier_max = 18\n").unwrap();
        let config = load_config(&dir).unwrap();
        assert_eq!(config.max_level, 150);
        assert_eq!(config.relic_tiers(), 10..=18);
        assert!(!config.slots.is_empty());
        cleanup(&dir);
    }

    #[test]
    fn csv_config_is_rejected() {
        let dir = make_test_dir("config_csv");
        fs::write(dir.join("config.csv"), "max_level\n150\n").unwrap();
        assert!(matches!(
            load_config(&dir),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        cleanup(&dir);
    }
}
