//! Load scenarios from TOML

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::classifier::{BoxClassifier, ExclusionZones, GeoBox};
use super::country::{Country, CountryProfile};
use super::diplomacy::Diplomacy;
use super::unit_type::UnitCatalog;
use super::Scenario;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;

/// Scenario file bundled with the crate
pub const BUILTIN_SCENARIO: &str = include_str!("../../data/scenarios/western_front_1939.toml");

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    simulation: SimulationConfig,
    #[serde(default)]
    unit_types: Option<UnitCatalog>,
    countries: BTreeMap<Country, CountryProfile>,
    #[serde(default)]
    diplomacy: DiplomacyTable,
    #[serde(default)]
    classifier: BoxClassifier,
    #[serde(default)]
    exclusion: Vec<GeoBox>,
}

#[derive(Debug, Default, Deserialize)]
struct DiplomacyTable {
    #[serde(default)]
    war: Vec<[Country; 2]>,
}

/// Parse and validate a scenario from TOML text
pub fn parse_scenario(content: &str) -> Result<Scenario> {
    let file: ScenarioFile = toml::from_str(content)?;

    let scenario = Scenario {
        config: file.simulation,
        unit_types: file.unit_types.unwrap_or_default(),
        countries: file.countries,
        diplomacy: Diplomacy::from_wars(file.diplomacy.war.into_iter().map(|[a, b]| (a, b))),
        classifier: file.classifier,
        exclusion: ExclusionZones::new(file.exclusion),
    };
    scenario.validate()?;

    Ok(scenario)
}

/// Load a scenario file from disk
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)?;
    let scenario = parse_scenario(&content)?;
    tracing::info!(
        "Loaded scenario {} ({} countries)",
        path.display(),
        scenario.countries.len()
    );
    Ok(scenario)
}
