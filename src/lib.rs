#![forbid(unsafe_code)]
//! Horaire : moteur de génération d'emplois du temps universitaires.
//!
//! - Entrée : un instantané immuable (salles, créneaux, cours, offres, enseignants).
//! - Contraintes dures : aucune double réservation (salle, enseignant, offre), capacité, type de salle.
//! - Contraintes souples pondérées (jours/fenêtres préférés, trous, taille de salle).
//! - Recherche avec retour arrière, budget d'exploration déterministe, mode réparation.

pub mod engine;
pub mod io;
pub mod model;
pub mod snapshot;
pub mod timetable;

pub use engine::{
    generate, Conflict, ConflictKind, EngineConfig, GenerateOptions, InputError, Weights,
};
pub use model::{
    Assignment, Course, CourseId, CourseType, Day, Faculty, FacultyId, Offering, OfferingId,
    Preferences, Room, RoomId, TimeSlot, TimeSlotId, TimeWindow, Unavailability,
};
pub use snapshot::Snapshot;
pub use timetable::Timetable;
