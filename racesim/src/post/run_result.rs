use crate::core::vehicle::{RunMode, VehicleId};
use helpers::general::fmt_secs;
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

/// ArrivalRecord is one vehicle that reached the finish line.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ArrivalRecord {
    pub vehicle_id: VehicleId,
    pub placement: String,
    pub time_s: Option<f64>,
}

/// RunResult contains everything about a finished run that is required for post-processing.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RunResult {
    pub mode: RunMode,
    pub elapsed_s: f64,
    pub arrivals: Vec<ArrivalRecord>,
    pub broken: Vec<VehicleId>,
}

#[derive(Debug, Serialize)]
struct StandingRow {
    position: Option<usize>,
    vehicle_id: VehicleId,
    standing: String,
    time_s: Option<f64>,
}

impl RunResult {
    pub fn winner(&self) -> Option<VehicleId> {
        match self.mode {
            RunMode::Race => self.arrivals.first().map(|arrival| arrival.vehicle_id),
            RunMode::Solo => None,
        }
    }

    fn standing_rows(&self) -> Vec<StandingRow> {
        let mut rows: Vec<StandingRow> = self
            .arrivals
            .iter()
            .enumerate()
            .map(|(i, arrival)| StandingRow {
                position: Some(i + 1),
                vehicle_id: arrival.vehicle_id,
                standing: arrival.placement.to_owned(),
                time_s: arrival.time_s,
            })
            .collect();
        rows.extend(self.broken.iter().map(|&id| StandingRow {
            position: None,
            vehicle_id: id,
            standing: "broken".to_owned(),
            time_s: None,
        }));
        rows
    }

    /// format_standings renders the standings as a plain text table.
    pub fn format_standings(&self) -> anyhow::Result<String> {
        let mut out = String::new();
        writeln!(
            &mut out,
            "RESULT: {} run, clock stopped at {}s",
            self.mode,
            fmt_secs(self.elapsed_s)
        )?;
        writeln!(&mut out, "pos,   car, standing   ,     time")?;
        for row in self.standing_rows() {
            let pos = row
                .position
                .map(|p| format!("{:3}", p))
                .unwrap_or_else(|| "  -".to_owned());
            let time = row
                .time_s
                .map(|t| format!("{:>8}s", fmt_secs(t)))
                .unwrap_or_else(|| "        -".to_owned());
            writeln!(
                &mut out,
                "{}, {:5}, {:11}, {}",
                pos, row.vehicle_id, row.standing, time
            )?;
        }
        Ok(out)
    }

    /// print_standings prints the standings to the console output.
    pub fn print_standings(&self) -> anyhow::Result<()> {
        print!("{}", self.format_standings()?);
        Ok(())
    }

    /// write_standings_to_file writes the standings as CSV, by default to output/last_run.csv.
    /// Returns the path to the written file.
    pub fn write_standings_to_file(&self, path: Option<&Path>) -> anyhow::Result<String> {
        let out_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let out_dir = Path::new("output");
                std::fs::create_dir_all(out_dir)?;
                out_dir.join("last_run.csv")
            }
        };
        write_csv(&out_path, &self.standing_rows())?;
        Ok(out_path.to_string_lossy().into_owned())
    }
}

fn write_csv(out_path: &Path, rows: &[StandingRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(out_path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
