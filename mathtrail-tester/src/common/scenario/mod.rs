pub mod catalog;

use crate::logic::SimulationPlan;
use catalog::{catalog_scenarios, find_catalog_scenario};

/// A named simulation plan runnable by the logic tester.
#[derive(Debug, Clone)]
pub struct TestScenario {
    /// CLI key, e.g. `full-game-perfect`.
    pub key: String,
    /// Human-readable name used in reports.
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(
        key: impl Into<String>,
        name: impl Into<String>,
        plan: SimulationPlan,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            plan,
        }
    }
}

/// Look up a scenario by key or short alias.
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "smoke" => "smoke",
        "board-layout" | "board" => "board-layout",
        "full-game-perfect" | "perfect" => "full-game-perfect",
        "full-game-careless" | "careless" => "full-game-careless",
        "full-game-steady" | "steady" => "full-game-steady",
        "calculator" | "calculator-fan" => "calculator",
        "multiplayer" | "seats" => "multiplayer",
        "paced" | "pacing" => "paced",
        "classroom" => "classroom",
        "deterministic" | "replay" => "deterministic",
        "exit-midgame" | "exit" => "exit-midgame",
        _ => return None,
    };
    find_catalog_scenario(key)
}

pub fn list_scenarios() -> Vec<(String, String)> {
    catalog_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.name))
        .collect()
}

/// Every scenario key, in catalog order.
pub fn all_scenario_keys() -> Vec<String> {
    catalog_scenarios()
        .into_iter()
        .map(|scenario| scenario.key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_catalog_entries() {
        assert_eq!(get_scenario("perfect").unwrap().key, "full-game-perfect");
        assert_eq!(get_scenario("EXIT").unwrap().key, "exit-midgame");
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, name) in list_scenarios() {
            let scenario = get_scenario(&key).unwrap();
            assert_eq!(scenario.name, name);
        }
        assert_eq!(all_scenario_keys().len(), list_scenarios().len());
    }
}
