//! Instantané d'un trimestre : toutes les entités nécessaires à une génération.
//!
//! L'instantané est validé une seule fois, avant toute recherche ; la vue
//! validée (`Catalog`) fournit des ordres d'itération déterministes.

use crate::engine::InputError;
use crate::model::{
    Course, CourseId, Day, Faculty, FacultyId, Offering, OfferingId, Room, RoomId, TimeSlot,
    TimeSlotId,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_days() -> Vec<Day> {
    Day::WEEKDAYS.to_vec()
}

/// Données d'entrée d'une génération (lecture seule pour le moteur).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_id: Option<String>,
    /// Jours ouvrés du trimestre.
    #[serde(default = "default_days")]
    pub days: Vec<Day>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub timeslots: Vec<TimeSlot>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub offerings: Vec<Offering>,
    #[serde(default)]
    pub faculty: Vec<Faculty>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            term_id: None,
            days: default_days(),
            rooms: Vec::new(),
            timeslots: Vec::new(),
            courses: Vec::new(),
            offerings: Vec::new(),
            faculty: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Vérifie l'intégrité de l'instantané et construit la vue indexée.
    pub fn validate(&self) -> Result<Catalog<'_>, InputError> {
        Catalog::build(self)
    }
}

/// Vue validée d'un `Snapshot`.
#[derive(Debug)]
pub struct Catalog<'a> {
    pub(crate) days: Vec<Day>,
    /// Créneaux triés par heure de début puis identifiant.
    pub(crate) slots: Vec<&'a TimeSlot>,
    pub(crate) slot_pos: FxHashMap<&'a TimeSlotId, usize>,
    /// Salles triées par capacité croissante puis identifiant.
    pub(crate) rooms: Vec<&'a Room>,
    pub(crate) room_by_id: FxHashMap<&'a RoomId, &'a Room>,
    pub(crate) courses: BTreeMap<&'a CourseId, &'a Course>,
    pub(crate) offerings: BTreeMap<&'a OfferingId, &'a Offering>,
    pub(crate) faculty: BTreeMap<&'a FacultyId, &'a Faculty>,
}

impl<'a> Catalog<'a> {
    fn build(snapshot: &'a Snapshot) -> Result<Self, InputError> {
        let mut days = snapshot.days.clone();
        days.sort();
        if let Some(pair) = days.windows(2).find(|w| w[0] == w[1]) {
            return Err(InputError::DuplicateDay(pair[0]));
        }

        let mut room_by_id = FxHashMap::default();
        for room in &snapshot.rooms {
            if room.capacity == 0 {
                return Err(InputError::InvalidCapacity(room.id.to_string()));
            }
            if room_by_id.insert(&room.id, room).is_some() {
                return Err(duplicate("room", room.id.as_str()));
            }
        }
        let mut rooms: Vec<&Room> = snapshot.rooms.iter().collect();
        rooms.sort_by(|a, b| a.capacity.cmp(&b.capacity).then_with(|| a.id.cmp(&b.id)));

        let mut slot_ids = FxHashSet::default();
        for slot in &snapshot.timeslots {
            if slot.end <= slot.start {
                return Err(InputError::InvalidTimeRange(slot.id.to_string()));
            }
            if !slot_ids.insert(&slot.id) {
                return Err(duplicate("timeslot", slot.id.as_str()));
            }
        }
        let mut slots: Vec<&TimeSlot> = snapshot.timeslots.iter().collect();
        slots.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        // triés par début : un chevauchement apparaît forcément entre voisins
        if let Some(pair) = slots.windows(2).find(|w| w[0].overlaps(w[1])) {
            return Err(InputError::OverlappingTimeSlots(
                pair[0].id.to_string(),
                pair[1].id.to_string(),
            ));
        }
        let slot_pos = slots
            .iter()
            .enumerate()
            .map(|(pos, &slot)| (&slot.id, pos))
            .collect();

        let mut courses = BTreeMap::new();
        for course in &snapshot.courses {
            let credits_ok = [course.theory_credits, course.lab_credits]
                .iter()
                .all(|c| c.is_finite() && *c >= 0.0);
            if !credits_ok {
                return Err(InputError::InvalidCredits(course.id.to_string()));
            }
            if courses.insert(&course.id, course).is_some() {
                return Err(duplicate("course", course.id.as_str()));
            }
        }

        let mut faculty = BTreeMap::new();
        for member in &snapshot.faculty {
            if faculty.insert(&member.id, member).is_some() {
                return Err(duplicate("faculty", member.id.as_str()));
            }
        }
        for member in &snapshot.faculty {
            for blocked in &member.unavailable {
                if !slot_ids.contains(&blocked.timeslot) {
                    return Err(unknown(
                        "faculty",
                        member.id.as_str(),
                        "timeslot",
                        blocked.timeslot.as_str(),
                    ));
                }
            }
        }

        let mut offerings = BTreeMap::new();
        for offering in &snapshot.offerings {
            if offerings.insert(&offering.id, offering).is_some() {
                return Err(duplicate("offering", offering.id.as_str()));
            }
            if !courses.contains_key(&offering.course) {
                return Err(unknown(
                    "offering",
                    offering.id.as_str(),
                    "course",
                    offering.course.as_str(),
                ));
            }
            if offering.instructors.is_empty() {
                return Err(InputError::NoInstructor(offering.id.to_string()));
            }
            if let Some(missing) = offering
                .instructors
                .iter()
                .find(|f| !faculty.contains_key(f))
            {
                return Err(unknown(
                    "offering",
                    offering.id.as_str(),
                    "faculty",
                    missing.as_str(),
                ));
            }
            let mut seen = FxHashSet::default();
            if let Some(twice) = offering.instructors.iter().find(|f| !seen.insert(*f)) {
                return Err(duplicate("instructor", &format!("{twice} (offering {})", offering.id)));
            }
            if let Some(window) = offering.preferences.window {
                if window.end <= window.start {
                    return Err(InputError::InvalidWindow(offering.id.to_string()));
                }
            }
            let weight = offering.preferences.weight;
            if !weight.is_finite() || weight < 0.0 {
                return Err(InputError::InvalidWeight {
                    name: "preferences.weight",
                    value: weight,
                });
            }
        }

        if !snapshot.offerings.is_empty() {
            if rooms.is_empty() {
                return Err(InputError::NoRooms);
            }
            if slots.is_empty() {
                return Err(InputError::NoTimeSlots);
            }
            if days.is_empty() {
                return Err(InputError::NoDays);
            }
        }

        Ok(Self {
            days,
            slots,
            slot_pos,
            rooms,
            room_by_id,
            courses,
            offerings,
            faculty,
        })
    }

    pub fn offering(&self, id: &OfferingId) -> Option<&'a Offering> {
        self.offerings.get(id).copied()
    }

    pub fn course_of(&self, offering: &Offering) -> Option<&'a Course> {
        self.courses.get(&offering.course).copied()
    }

    pub fn room(&self, id: &RoomId) -> Option<&'a Room> {
        self.room_by_id.get(id).copied()
    }

    pub fn faculty(&self, id: &FacultyId) -> Option<&'a Faculty> {
        self.faculty.get(id).copied()
    }

    pub fn slot_position(&self, id: &TimeSlotId) -> Option<usize> {
        self.slot_pos.get(id).copied()
    }

    pub fn slot(&self, id: &TimeSlotId) -> Option<&'a TimeSlot> {
        self.slot_position(id).map(|pos| self.slots[pos])
    }

    pub fn has_day(&self, day: Day) -> bool {
        self.days.binary_search(&day).is_ok()
    }

    /// Salles compatibles avec l'offre (type et capacité), de la plus petite à la plus grande.
    pub fn rooms_for(&self, offering: &Offering) -> Vec<&'a Room> {
        let required_type = self
            .course_of(offering)
            .and_then(|c| c.room_type.as_deref());
        self.rooms
            .iter()
            .copied()
            .filter(|room| room_fits(room, offering, required_type))
            .collect()
    }
}

pub(crate) fn room_fits(room: &Room, offering: &Offering, required_type: Option<&str>) -> bool {
    let type_ok = match required_type {
        Some(wanted) => room.room_type.as_deref() == Some(wanted),
        None => true,
    };
    let size_ok = offering
        .enrollment_limit
        .map_or(true, |size| room.capacity >= size);
    type_ok && size_ok
}

fn duplicate(entity: &'static str, id: &str) -> InputError {
    InputError::DuplicateId {
        entity,
        id: id.to_string(),
    }
}

fn unknown(entity: &'static str, id: &str, target: &'static str, target_id: &str) -> InputError {
    InputError::UnknownReference {
        entity,
        id: id.to_string(),
        target,
        target_id: target_id.to_string(),
    }
}
