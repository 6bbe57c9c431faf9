use crate::model::{Day, FacultyId, OfferingId, RoomId, TimeSlotId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_BUDGET: u64 = 50_000;

/// Poids des pénalités souples (toutes ≥ 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Jour hors des jours préférés de l'offre.
    pub offering_day: f64,
    /// Créneau hors de la fenêtre préférée de l'offre.
    pub time_window: f64,
    /// Jour hors des jours préférés de l'enseignant.
    pub faculty_day: f64,
    /// Par créneau creux entre deux cours d'un même enseignant le même jour.
    pub faculty_gap: f64,
    /// Fraction de capacité de salle inutilisée.
    pub room_slack: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            offering_day: 1.0,
            time_window: 1.0,
            faculty_day: 1.0,
            faculty_gap: 0.5,
            room_slack: 0.1,
        }
    }
}

impl Weights {
    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("offering_day", self.offering_day),
            ("time_window", self.time_window),
            ("faculty_day", self.faculty_day),
            ("faculty_gap", self.faculty_gap),
            ("room_slack", self.room_slack),
        ]
    }

    pub fn validate(&self) -> Result<(), InputError> {
        for (name, value) in self.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(InputError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Options de génération
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    /// Nombre maximal de pas d'exploration (candidats essayés + offres sautées).
    pub budget: u64,
    pub weights: Weights,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            weights: Weights::default(),
        }
    }
}

impl GenerateOptions {
    pub fn with_budget(budget: u64) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.budget == 0 {
            return Err(InputError::InvalidBudget);
        }
        self.weights.validate()
    }
}

/// Configuration chargée depuis un fichier JSON ; tout champ absent prend sa valeur par défaut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub budget: u64,
    pub weights: Weights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            weights: Weights::default(),
        }
    }
}

impl From<EngineConfig> for GenerateOptions {
    fn from(cfg: EngineConfig) -> Self {
        Self {
            budget: cfg.budget,
            weights: cfg.weights,
        }
    }
}

/// Violation d'une contrainte dure détectée par l'index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    RoomConflict,
    FacultyConflict,
    OfferingAlreadyScheduled,
}

/// Paire d'affectations en conflit dans un emploi du temps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub offering_a: OfferingId,
    pub offering_b: OfferingId,
    pub day: Day,
    pub timeslot: TimeSlotId,
}

/// Raison pour laquelle un candidat est écarté.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Conflict(ConflictKind),
    UnknownRoom(RoomId),
    UnknownTimeSlot(TimeSlotId),
    UnknownFaculty(FacultyId),
    UnknownOffering(OfferingId),
    DayOutsideTerm(Day),
    CapacityTooSmall { capacity: u32, required: u32 },
    RoomTypeMismatch,
    NotAnInstructor,
    FacultyUnavailable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Conflict(ConflictKind::RoomConflict) => f.write_str("room already occupied"),
            Rejection::Conflict(ConflictKind::FacultyConflict) => {
                f.write_str("faculty already teaching")
            }
            Rejection::Conflict(ConflictKind::OfferingAlreadyScheduled) => {
                f.write_str("offering scheduled twice")
            }
            Rejection::UnknownRoom(id) => write!(f, "unknown room {id}"),
            Rejection::UnknownTimeSlot(id) => write!(f, "unknown timeslot {id}"),
            Rejection::UnknownFaculty(id) => write!(f, "unknown faculty {id}"),
            Rejection::UnknownOffering(id) => write!(f, "unknown offering {id}"),
            Rejection::DayOutsideTerm(day) => write!(f, "day {day} is not a working day"),
            Rejection::CapacityTooSmall { capacity, required } => {
                write!(f, "room capacity {capacity} below class size {required}")
            }
            Rejection::RoomTypeMismatch => f.write_str("room type does not match course"),
            Rejection::NotAnInstructor => f.write_str("faculty does not teach this offering"),
            Rejection::FacultyUnavailable => f.write_str("faculty unavailable"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("duplicate {entity} id: {id}")]
    DuplicateId { entity: &'static str, id: String },
    #[error("{entity} {id} references unknown {target} {target_id}")]
    UnknownReference {
        entity: &'static str,
        id: String,
        target: &'static str,
        target_id: String,
    },
    #[error("invalid time range for timeslot {0}: end must be after start")]
    InvalidTimeRange(String),
    #[error("timeslots {0} and {1} overlap")]
    OverlappingTimeSlots(String, String),
    #[error("room {0} must have a positive capacity")]
    InvalidCapacity(String),
    #[error("course {0} has negative or non-finite credits")]
    InvalidCredits(String),
    #[error("preferred window of offering {0} must end after it starts")]
    InvalidWindow(String),
    #[error("offering {0} has no instructor")]
    NoInstructor(String),
    #[error("no rooms supplied for a non-empty offering set")]
    NoRooms,
    #[error("no timeslots supplied for a non-empty offering set")]
    NoTimeSlots,
    #[error("no working days supplied for a non-empty offering set")]
    NoDays,
    #[error("day {0} listed twice")]
    DuplicateDay(Day),
    #[error("weight {name} must be finite and non-negative (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("exploration budget must be positive")]
    InvalidBudget,
    #[error("previous assignment for offering {offering} is inconsistent: {reason}")]
    InconsistentPrevious { offering: String, reason: String },
}
