use super::ConflictKind;
use crate::model::{
    Assignment, Day, FacultyId, FacultyKey, OfferingId, RoomId, RoomKey, TimeSlotId,
};
use rustc_hash::FxHashMap;

/// Occupation courante : trois tables (salle, enseignant, offre) tenues à jour ensemble.
///
/// Propriété exclusive d'une recherche ; jamais partagé entre threads.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConstraintIndex {
    rooms: FxHashMap<RoomKey, OfferingId>,
    faculty: FxHashMap<FacultyKey, OfferingId>,
    offerings: FxHashMap<OfferingId, Assignment>,
}

impl ConstraintIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.offerings.len()
    }

    /// Premier conflit que provoquerait `a`, sans rien modifier.
    pub(crate) fn conflict_for(&self, a: &Assignment) -> Option<ConflictKind> {
        if let Some(other) = self.rooms.get(&a.room_conflict_key()) {
            if other != &a.offering {
                return Some(ConflictKind::RoomConflict);
            }
        }
        if let Some(other) = self.faculty.get(&a.faculty_conflict_key()) {
            if other != &a.offering {
                return Some(ConflictKind::FacultyConflict);
            }
        }
        if self.offerings.contains_key(a.offering_key()) {
            return Some(ConflictKind::OfferingAlreadyScheduled);
        }
        None
    }

    /// Insère dans les trois tables, ou dans aucune.
    pub(crate) fn try_insert(&mut self, a: &Assignment) -> Result<(), ConflictKind> {
        if let Some(kind) = self.conflict_for(a) {
            return Err(kind);
        }
        self.rooms.insert(a.room_conflict_key(), a.offering.clone());
        self.faculty.insert(a.faculty_conflict_key(), a.offering.clone());
        self.offerings.insert(a.offering.clone(), a.clone());
        Ok(())
    }

    /// Retire `a` des trois tables ; sans effet si `a` n'est pas l'occupant enregistré.
    pub(crate) fn remove(&mut self, a: &Assignment) {
        if self.offerings.get(a.offering_key()) != Some(a) {
            return;
        }
        self.offerings.remove(a.offering_key());
        self.rooms.remove(&a.room_conflict_key());
        self.faculty.remove(&a.faculty_conflict_key());
    }

    pub(crate) fn room_occupant(
        &self,
        day: Day,
        slot: &TimeSlotId,
        room: &RoomId,
    ) -> Option<&Assignment> {
        let key = RoomKey(room.clone(), day, slot.clone());
        self.rooms.get(&key).and_then(|o| self.offerings.get(o))
    }

    pub(crate) fn faculty_occupant(
        &self,
        day: Day,
        slot: &TimeSlotId,
        faculty: &FacultyId,
    ) -> Option<&Assignment> {
        let key = FacultyKey(faculty.clone(), day, slot.clone());
        self.faculty.get(&key).and_then(|o| self.offerings.get(o))
    }

    pub(crate) fn offering_assignment(&self, offering: &OfferingId) -> Option<&Assignment> {
        self.offerings.get(offering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asg(offering: &str, day: Day, slot: &str, room: &str, faculty: &str) -> Assignment {
        Assignment {
            offering: OfferingId::new(offering),
            day,
            timeslot: TimeSlotId::new(slot),
            room: RoomId::new(room),
            faculty: FacultyId::new(faculty),
        }
    }

    #[test]
    fn insert_then_query() {
        let mut idx = ConstraintIndex::new();
        let a = asg("o1", Day::Monday, "s1", "r1", "f1");
        idx.try_insert(&a).unwrap();
        assert_eq!(idx.len(), 1);
        assert_eq!(
            idx.room_occupant(Day::Monday, &TimeSlotId::new("s1"), &RoomId::new("r1")),
            Some(&a)
        );
        assert_eq!(
            idx.faculty_occupant(Day::Monday, &TimeSlotId::new("s1"), &FacultyId::new("f1")),
            Some(&a)
        );
        assert!(idx
            .room_occupant(Day::Tuesday, &TimeSlotId::new("s1"), &RoomId::new("r1"))
            .is_none());
    }

    #[test]
    fn conflicts_are_reported_by_kind() {
        let mut idx = ConstraintIndex::new();
        idx.try_insert(&asg("o1", Day::Monday, "s1", "r1", "f1"))
            .unwrap();

        assert_eq!(
            idx.try_insert(&asg("o2", Day::Monday, "s1", "r1", "f2")),
            Err(ConflictKind::RoomConflict)
        );
        assert_eq!(
            idx.try_insert(&asg("o2", Day::Monday, "s1", "r2", "f1")),
            Err(ConflictKind::FacultyConflict)
        );
        assert_eq!(
            idx.try_insert(&asg("o1", Day::Tuesday, "s1", "r1", "f1")),
            Err(ConflictKind::OfferingAlreadyScheduled)
        );
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn failed_insert_leaves_no_partial_state() {
        let mut idx = ConstraintIndex::new();
        idx.try_insert(&asg("o1", Day::Monday, "s1", "r1", "f1"))
            .unwrap();
        // salle libre mais enseignant occupé : rien ne doit être écrit pour r2
        let rejected = asg("o2", Day::Monday, "s1", "r2", "f1");
        assert!(idx.try_insert(&rejected).is_err());
        assert!(idx
            .room_occupant(Day::Monday, &TimeSlotId::new("s1"), &RoomId::new("r2"))
            .is_none());
        assert!(idx.offering_assignment(&OfferingId::new("o2")).is_none());
    }

    #[test]
    fn remove_is_noop_for_foreign_assignment() {
        let mut idx = ConstraintIndex::new();
        let a = asg("o1", Day::Monday, "s1", "r1", "f1");
        idx.try_insert(&a).unwrap();

        idx.remove(&asg("o1", Day::Friday, "s9", "r9", "f9"));
        assert_eq!(idx.len(), 1);

        idx.remove(&a);
        assert_eq!(idx.len(), 0);
        assert!(idx.try_insert(&asg("o2", Day::Monday, "s1", "r1", "f1")).is_ok());
        idx.remove(&a);
        assert_eq!(idx.len(), 1);
    }
}
