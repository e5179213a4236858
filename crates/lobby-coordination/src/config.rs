//! Bootstrap configuration for the station registry.
//!
//! Station display names may be seeded from configuration at first
//! bootstrap only; the registry is the source of truth afterwards, so a
//! rename is never clobbered by a restart.

use serde::Deserialize;
use serde::Serialize;

use crate::station::Station;

/// Default values for configuration.
mod defaults {
    use super::StationSeed;

    pub fn station_count() -> u32 {
        3
    }

    pub fn stations() -> Vec<StationSeed> {
        (1..=station_count())
            .map(|n| StationSeed {
                id: n.to_string(),
                name: String::new(),
            })
            .collect()
    }
}

/// One station to create at first bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StationSeed {
    /// Stable station id.
    pub id: String,
    /// Display name; blank means "use the generated default".
    #[serde(default)]
    pub name: String,
}

impl StationSeed {
    /// The name this seed resolves to.
    pub fn display_name(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            Station::default_name(&self.id)
        } else {
            trimmed.to_string()
        }
    }
}

/// Stations to create when no registry exists yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Stations seeded at first bootstrap.
    #[serde(default = "defaults::stations")]
    pub stations: Vec<StationSeed>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            stations: defaults::stations(),
        }
    }
}

impl BootstrapConfig {
    /// Build the default three-station config, with names overridable via
    /// `STATION_<n>_NAME` environment variables.
    pub fn from_env() -> Self {
        let stations = (1..=defaults::station_count())
            .map(|n| StationSeed {
                id: n.to_string(),
                name: std::env::var(format!("STATION_{n}_NAME")).unwrap_or_default(),
            })
            .collect();
        Self { stations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_three_stations() {
        let config = BootstrapConfig::default();
        assert_eq!(config.stations.len(), 3);
        assert_eq!(config.stations[0].id, "1");
        assert_eq!(config.stations[0].display_name(), "Station 1");
    }

    #[test]
    fn seed_name_overrides_default() {
        let seed = StationSeed {
            id: "2".to_string(),
            name: "  Records Desk ".to_string(),
        };
        assert_eq!(seed.display_name(), "Records Desk");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: BootstrapConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BootstrapConfig::default());

        let config: BootstrapConfig =
            serde_json::from_str(r#"{"stations":[{"id":"1","name":"A"}]}"#).unwrap();
        assert_eq!(config.stations.len(), 1);
        assert_eq!(config.stations[0].display_name(), "A");
    }
}
