use crate::core::vehicle::VehicleId;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;

/// Placement of a vehicle that arrived at the finish line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    First,
    Second,
    Third,
    Participant,
}

impl Placement {
    fn from_podium_slot(slot: usize) -> Placement {
        match slot {
            0 => Placement::First,
            1 => Placement::Second,
            2 => Placement::Third,
            _ => Placement::Participant,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Placement::First => write!(f, "1st"),
            Placement::Second => write!(f, "2nd"),
            Placement::Third => write!(f, "3rd"),
            Placement::Participant => write!(f, "participant"),
        }
    }
}

/// Standing of a vehicle within the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Placed(Placement),
    Broken,
    Unresolved,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Standing::Placed(placement) => write!(f, "{}", placement),
            Standing::Broken => write!(f, "broken"),
            Standing::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// PlacementError signals a broken bookkeeping invariant. It is a programming defect on the
/// caller's side, not a race outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    DuplicateArrival(VehicleId),
    ArrivalAfterBreakdown(VehicleId),
    BreakdownAfterArrival(VehicleId),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlacementError::DuplicateArrival(id) => {
                write!(f, "Car {} was registered as arrived twice", id)
            }
            PlacementError::ArrivalAfterBreakdown(id) => {
                write!(f, "Car {} arrived although it broke down", id)
            }
            PlacementError::BreakdownAfterArrival(id) => {
                write!(f, "Car {} broke down although it already arrived", id)
            }
        }
    }
}

impl Error for PlacementError {}

/// PlacementTracker records the arrival order of finished vehicles and, separately, the vehicles
/// that broke down. Podium slots are never handed out twice within a run, even if a placed
/// vehicle is forgotten afterwards.
#[derive(Debug, Default)]
pub struct PlacementTracker {
    arrivals: Vec<(VehicleId, Placement)>,
    podium_slots_used: usize,
    broken: BTreeSet<VehicleId>,
    enrolled: BTreeSet<VehicleId>,
}

impl PlacementTracker {
    pub fn new() -> PlacementTracker {
        Default::default()
    }

    /// enroll marks a vehicle as part of the run, so that it counts for run resolution.
    pub fn enroll(&mut self, id: VehicleId) {
        self.enrolled.insert(id);
    }

    pub fn register_arrival(&mut self, id: VehicleId) -> Result<Placement, PlacementError> {
        if self.broken.contains(&id) {
            return Err(PlacementError::ArrivalAfterBreakdown(id));
        }
        if self.arrivals.iter().any(|&(arrived, _)| arrived == id) {
            return Err(PlacementError::DuplicateArrival(id));
        }

        let placement = Placement::from_podium_slot(self.podium_slots_used);
        if placement != Placement::Participant {
            self.podium_slots_used += 1;
        }
        self.enrolled.insert(id);
        self.arrivals.push((id, placement));
        Ok(placement)
    }

    pub fn register_breakdown(&mut self, id: VehicleId) -> Result<(), PlacementError> {
        if self.arrivals.iter().any(|&(arrived, _)| arrived == id) {
            return Err(PlacementError::BreakdownAfterArrival(id));
        }
        self.enrolled.insert(id);
        self.broken.insert(id);
        Ok(())
    }

    /// is_run_resolved is true if no vehicle is active anymore and every enrolled vehicle either
    /// arrived or broke down.
    pub fn is_run_resolved(&self, active_ids: &BTreeSet<VehicleId>) -> bool {
        active_ids.is_empty()
            && self
                .enrolled
                .iter()
                .all(|&id| self.standing_of(id) != Standing::Unresolved)
    }

    pub fn standing_of(&self, id: VehicleId) -> Standing {
        if self.broken.contains(&id) {
            return Standing::Broken;
        }
        self.arrivals
            .iter()
            .find(|&&(arrived, _)| arrived == id)
            .map(|&(_, placement)| Standing::Placed(placement))
            .unwrap_or(Standing::Unresolved)
    }

    /// arrivals returns (vehicle id, placement) pairs in arrival order.
    pub fn arrivals(&self) -> &[(VehicleId, Placement)] {
        &self.arrivals
    }

    pub fn broken(&self) -> &BTreeSet<VehicleId> {
        &self.broken
    }

    /// forget drops every record of the vehicle. Used when a vehicle is stopped manually.
    pub fn forget(&mut self, id: VehicleId) {
        self.arrivals.retain(|&(arrived, _)| arrived != id);
        self.broken.remove(&id);
        self.enrolled.remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.broken.is_empty() && self.enrolled.is_empty()
    }

    pub fn clear(&mut self) {
        self.arrivals.clear();
        self.podium_slots_used = 0;
        self.broken.clear();
        self.enrolled.clear();
    }
}
