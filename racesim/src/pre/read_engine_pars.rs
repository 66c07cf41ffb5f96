use crate::core::animator::TuningPars;
use crate::core::session::{BreakdownPars, Phrases};
use crate::core::vehicle::VehicleId;
use crate::interfaces::simulated_backend::BackendPars;
use anyhow::Context;
use helpers::general::InputValueError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;

/// * `id` - Vehicle id as known to the registry
/// * `name` - Display name, e.g. Tesla Model S
#[derive(Debug, Deserialize, Clone)]
pub struct RosterEntry {
    pub id: VehicleId,
    pub name: String,
}

/// EnginePars is used to store all other parameter structs. Every section is optional in the
/// parameter file.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnginePars {
    pub tuning: TuningPars,
    pub breakdown: BreakdownPars,
    pub phrases: Phrases,
    pub backend: BackendPars,
    pub roster: Vec<RosterEntry>,
}

impl Default for EnginePars {
    fn default() -> Self {
        let names = ["Tesla Model S", "BMW M3", "Ford Mustang", "Lada Niva", "Audi TT"];
        EnginePars {
            tuning: Default::default(),
            breakdown: Default::default(),
            phrases: Default::default(),
            backend: Default::default(),
            roster: names
                .iter()
                .enumerate()
                .map(|(i, name)| RosterEntry {
                    id: i as VehicleId + 1,
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

impl EnginePars {
    /// validate checks the values the engine divides by or schedules with.
    pub fn validate(&self) -> Result<(), InputValueError> {
        if !(self.tuning.scale_v > 0.0) {
            return Err(InputValueError::new("tuning.scale_v"));
        }
        if !(self.tuning.scale_d > 0.0) {
            return Err(InputValueError::new("tuning.scale_d"));
        }
        if self.tuning.clock_period_ms == 0 {
            return Err(InputValueError::new("tuning.clock_period_ms"));
        }
        if self.tuning.frame_period_ms == 0 {
            return Err(InputValueError::new("tuning.frame_period_ms"));
        }
        if !(0.0..=1.0).contains(&self.backend.breakdown_chance) {
            return Err(InputValueError::new("backend.breakdown_chance"));
        }
        if self.backend.velocity_min > self.backend.velocity_max {
            return Err(InputValueError::new("backend.velocity_min"));
        }
        Ok(())
    }

    /// roster_ids returns the ids of the first `limit` roster entries (all if None).
    pub fn roster_ids(&self, limit: Option<usize>) -> Vec<VehicleId> {
        let limit = limit.unwrap_or_else(|| self.roster.len());
        self.roster.iter().take(limit).map(|entry| entry.id).collect()
    }

    pub fn roster_names(&self) -> HashMap<VehicleId, String> {
        self.roster
            .iter()
            .map(|entry| (entry.id, entry.name.to_owned()))
            .collect()
    }
}

/// read_engine_pars reads the JSON file and decodes the JSON string into the engine parameters
/// struct.
pub fn read_engine_pars(filepath: &Path) -> anyhow::Result<EnginePars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}
