use super::index::ConstraintIndex;
use super::{Rejection, Weights};
use crate::model::{Assignment, Day, Faculty, FacultyId, Offering, OfferingId, Room, TimeSlot};
use crate::snapshot::{room_fits, Catalog};

/// Décide si une affectation est admissible et, si oui, calcule son coût souple.
pub(crate) struct Checker<'c, 'a> {
    catalog: &'c Catalog<'a>,
    weights: Weights,
}

/// Entités résolues d'une affectation admissible.
struct Resolved<'a> {
    offering: &'a Offering,
    room: &'a Room,
    slot: &'a TimeSlot,
    slot_pos: usize,
    faculty: &'a Faculty,
}

impl<'c, 'a> Checker<'c, 'a> {
    pub(crate) fn new(catalog: &'c Catalog<'a>, weights: Weights) -> Self {
        Self { catalog, weights }
    }

    /// Contraintes dures puis coût souple (≥ 0, plus bas = meilleur).
    pub(crate) fn evaluate(
        &self,
        index: &ConstraintIndex,
        a: &Assignment,
    ) -> Result<f64, Rejection> {
        self.admissible(a)?;
        if let Some(kind) = index.conflict_for(a) {
            return Err(Rejection::Conflict(kind));
        }
        self.cost(index, a)
    }

    /// Contraintes dures indépendantes de l'occupation courante.
    pub(crate) fn admissible(&self, a: &Assignment) -> Result<(), Rejection> {
        let r = self.resolve(a)?;
        let required_type = self
            .catalog
            .course_of(r.offering)
            .and_then(|c| c.room_type.as_deref());
        if !room_fits(r.room, r.offering, required_type) {
            if let Some(required) = r.offering.enrollment_limit {
                if r.room.capacity < required {
                    return Err(Rejection::CapacityTooSmall {
                        capacity: r.room.capacity,
                        required,
                    });
                }
            }
            return Err(Rejection::RoomTypeMismatch);
        }
        if !r.offering.instructors.contains(&a.faculty) {
            return Err(Rejection::NotAnInstructor);
        }
        if r.faculty.is_unavailable(a.day, &a.timeslot) {
            return Err(Rejection::FacultyUnavailable);
        }
        Ok(())
    }

    /// Coût souple de `a` face aux affectations de `index` (hors `a` elle-même).
    pub(crate) fn cost(&self, index: &ConstraintIndex, a: &Assignment) -> Result<f64, Rejection> {
        let r = self.resolve(a)?;
        let w = &self.weights;
        let prefs = &r.offering.preferences;
        let mut cost = 0.0;

        if !prefs.days.is_empty() && !prefs.days.contains(&a.day) {
            cost += prefs.weight * w.offering_day;
        }
        if let Some(window) = prefs.window {
            if !window.contains(r.slot) {
                cost += prefs.weight * w.time_window;
            }
        }
        if !r.faculty.preferred_days.is_empty() && !r.faculty.preferred_days.contains(&a.day) {
            cost += w.faculty_day;
        }
        let gap = self.idle_slots(index, a, &a.faculty, a.day, r.slot_pos);
        cost += gap as f64 * w.faculty_gap;
        if let Some(size) = r.offering.enrollment_limit {
            let capacity = f64::from(r.room.capacity);
            cost += (capacity - f64::from(size)) / capacity * w.room_slack;
        }
        Ok(cost)
    }

    /// Créneaux libres entre `pos` et le cours le plus proche du même enseignant ce jour-là.
    fn idle_slots(
        &self,
        index: &ConstraintIndex,
        a: &Assignment,
        faculty: &FacultyId,
        day: Day,
        pos: usize,
    ) -> usize {
        let slots = &self.catalog.slots;
        let busy = |p: usize| {
            index
                .faculty_occupant(day, &slots[p].id, faculty)
                .is_some_and(|other| other.offering != a.offering)
        };
        for dist in 1..slots.len() {
            let below = pos.checked_sub(dist).is_some_and(|p| busy(p));
            let above = pos + dist < slots.len() && busy(pos + dist);
            if below || above {
                return dist - 1;
            }
        }
        0
    }

    /// Pénalités de trou des cours de `faculty` ce jour-là, hors `skip`.
    ///
    /// Seul ce terme d'un cours dépend des autres affectations : la différence
    /// avant/après une insertion donne la variation du coût total des voisins.
    pub(crate) fn others_gap_cost(
        &self,
        index: &ConstraintIndex,
        faculty: &FacultyId,
        day: Day,
        skip: &OfferingId,
    ) -> f64 {
        let slots = &self.catalog.slots;
        let mut total = 0.0;
        for (pos, slot) in slots.iter().enumerate() {
            if let Some(other) = index.faculty_occupant(day, &slot.id, faculty) {
                if &other.offering != skip {
                    total += self.idle_slots(index, other, faculty, day, pos) as f64
                        * self.weights.faculty_gap;
                }
            }
        }
        total
    }

    fn resolve(&self, a: &Assignment) -> Result<Resolved<'a>, Rejection> {
        let offering = self
            .catalog
            .offering(&a.offering)
            .ok_or_else(|| Rejection::UnknownOffering(a.offering.clone()))?;
        let room = self
            .catalog
            .room(&a.room)
            .ok_or_else(|| Rejection::UnknownRoom(a.room.clone()))?;
        let slot_pos = self
            .catalog
            .slot_position(&a.timeslot)
            .ok_or_else(|| Rejection::UnknownTimeSlot(a.timeslot.clone()))?;
        let faculty = self
            .catalog
            .faculty(&a.faculty)
            .ok_or_else(|| Rejection::UnknownFaculty(a.faculty.clone()))?;
        if !self.catalog.has_day(a.day) {
            return Err(Rejection::DayOutsideTerm(a.day));
        }
        Ok(Resolved {
            offering,
            room,
            slot: self.catalog.slots[slot_pos],
            slot_pos,
            faculty,
        })
    }

    /// Coût total d'un ensemble d'affectations déjà indexées, dans l'ordre fourni.
    pub(crate) fn total_cost(&self, index: &ConstraintIndex, assignments: &[Assignment]) -> f64 {
        assignments
            .iter()
            .filter_map(|a| self.cost(index, a).ok())
            .sum()
    }
}
