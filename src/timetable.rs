use crate::engine::{Conflict, ConflictKind};
use crate::model::{Assignment, OfferingId};
use serde::{Deserialize, Serialize};

/// Emploi du temps produit par le moteur.
///
/// Les affectations sont triées par jour puis heure de début du créneau.
/// Dans un résultat de [`generate`](crate::generate), `valid` vaut `true`
/// uniquement si toutes les offres sont placées et `unplaced` liste les autres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_id: Option<String>,
    pub assignments: Vec<Assignment>,
    pub valid: bool,
    #[serde(default)]
    pub unplaced: Vec<OfferingId>,
    #[serde(default)]
    pub total_soft_cost: f64,
    /// Pas d'exploration consommés.
    #[serde(default)]
    pub steps: u64,
}

impl Timetable {
    pub(crate) fn new(
        term_id: Option<String>,
        assignments: Vec<Assignment>,
        unplaced: Vec<OfferingId>,
        total_soft_cost: f64,
        steps: u64,
    ) -> Self {
        Self {
            term_id,
            valid: unplaced.is_empty(),
            assignments,
            unplaced,
            total_soft_cost,
            steps,
        }
    }

    /// Entrée de réparation construite à la main.
    ///
    /// Sans instantané, ni `valid` ni `unplaced` ne peuvent être calculés : ils
    /// restent à `false` et vide, `generate` les recalcule à partir du résultat.
    pub fn from_assignments(term_id: Option<String>, assignments: Vec<Assignment>) -> Self {
        Self {
            term_id,
            assignments,
            valid: false,
            unplaced: Vec::new(),
            total_soft_cost: 0.0,
            steps: 0,
        }
    }

    /// Copie sans l'affectation de `offering`, comme entrée de réparation.
    pub fn without_offering(&self, offering: &OfferingId) -> Self {
        let assignments = self
            .assignments
            .iter()
            .filter(|a| &a.offering != offering)
            .cloned()
            .collect();
        Self::from_assignments(self.term_id.clone(), assignments)
    }

    pub fn placed_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn assignment_for(&self, offering: &OfferingId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.offering == offering)
    }

    /// Vérification exhaustive par paires des trois clés de conflit.
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        let mut out = Vec::new();
        for (idx, a) in self.assignments.iter().enumerate() {
            for b in self.assignments.iter().skip(idx + 1) {
                let mut push = |kind| {
                    out.push(Conflict {
                        kind,
                        offering_a: a.offering.clone(),
                        offering_b: b.offering.clone(),
                        day: a.day,
                        timeslot: a.timeslot.clone(),
                    })
                };
                if a.offering == b.offering {
                    push(ConflictKind::OfferingAlreadyScheduled);
                }
                if a.room_conflict_key() == b.room_conflict_key() {
                    push(ConflictKind::RoomConflict);
                }
                if a.faculty_conflict_key() == b.faculty_conflict_key() {
                    push(ConflictKind::FacultyConflict);
                }
            }
        }
        out
    }
}
