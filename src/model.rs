use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Room
    RoomId
);
string_id!(
    /// Identifiant fort pour TimeSlot
    TimeSlotId
);
string_id!(
    /// Identifiant fort pour Course
    CourseId
);
string_id!(
    /// Identifiant fort pour Offering
    OfferingId
);
string_id!(
    /// Identifiant fort pour Faculty
    FacultyId
);
string_id!(DepartmentId);

/// Jour de la semaine, ordre total lundi < … < dimanche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "Mon", alias = "Monday")]
    Monday,
    #[serde(rename = "Tue", alias = "Tuesday")]
    Tuesday,
    #[serde(rename = "Wed", alias = "Wednesday")]
    Wednesday,
    #[serde(rename = "Thu", alias = "Thursday")]
    Thursday,
    #[serde(rename = "Fri", alias = "Friday")]
    Friday,
    #[serde(rename = "Sat", alias = "Saturday")]
    Saturday,
    #[serde(rename = "Sun", alias = "Sunday")]
    Sunday,
}

impl Day {
    pub const WEEKDAYS: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            Day::Monday => "Mon",
            Day::Tuesday => "Tue",
            Day::Wednesday => "Wed",
            Day::Thursday => "Thu",
            Day::Friday => "Fri",
            Day::Saturday => "Sat",
            Day::Sunday => "Sun",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Salle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub name: String,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
}

impl Room {
    pub fn new(id: &str, capacity: u32, room_type: Option<&str>) -> Self {
        Self {
            id: RoomId::new(id),
            name: id.to_string(),
            capacity,
            room_type: room_type.map(str::to_string),
        }
    }
}

/// Créneau horaire dans une journée (heure murale, [start, end)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Crée un créneau en validant que `end > start`.
    pub fn new(id: &str, start: NaiveTime, end: NaiveTime) -> Result<Self, String> {
        if end <= start {
            return Err("timeslot end must be strictly after start".to_string());
        }
        Ok(Self {
            id: TimeSlotId::new(id),
            start,
            end,
        })
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Fenêtre horaire préférée (bornes incluses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn contains(&self, slot: &TimeSlot) -> bool {
        self.start <= slot.start && slot.end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseType {
    Major,
    Minor,
    Skill,
    #[serde(rename = "AEC")]
    Aec,
    #[serde(rename = "VAC")]
    Vac,
    Lab,
}

/// Cours (données de référence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub course_type: CourseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentId>,
    #[serde(default)]
    pub theory_credits: f64,
    #[serde(default)]
    pub lab_credits: f64,
    /// Type de salle exigé (comparé à `Room::room_type`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
}

/// Préférences déjà résolues pour une offre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<Day>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<TimeWindow>,
    /// Multiplicateur appliqué aux pénalités propres à l'offre.
    #[serde(default = "default_preference_weight")]
    pub weight: f64,
}

fn default_preference_weight() -> f64 {
    1.0
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            days: Vec::new(),
            window: None,
            weight: default_preference_weight(),
        }
    }
}

/// Offre de cours : l'unité planifiée.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub id: OfferingId,
    pub course: CourseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_limit: Option<u32>,
    /// Enseignants possibles, dans l'ordre déclaré.
    pub instructors: Vec<FacultyId>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl Offering {
    pub fn new(id: &str, course: &str, instructor: &str) -> Self {
        Self {
            id: OfferingId::new(id),
            course: CourseId::new(course),
            section: None,
            enrollment_limit: None,
            instructors: vec![FacultyId::new(instructor)],
            preferences: Preferences::default(),
        }
    }
}

/// Couple (jour, créneau) bloqué pour un enseignant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unavailability {
    pub day: Day,
    pub timeslot: TimeSlotId,
}

/// Enseignant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_days: Vec<Day>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<Unavailability>,
}

impl Faculty {
    pub fn new<N: Into<String>>(id: &str, name: N) -> Self {
        Self {
            id: FacultyId::new(id),
            name: name.into(),
            department: None,
            email: None,
            preferred_days: Vec::new(),
            unavailable: Vec::new(),
        }
    }

    pub fn is_unavailable(&self, day: Day, timeslot: &TimeSlotId) -> bool {
        self.unavailable
            .iter()
            .any(|u| u.day == day && &u.timeslot == timeslot)
    }
}

/// Clé de conflit salle : (salle, jour, créneau).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomKey(pub RoomId, pub Day, pub TimeSlotId);

/// Clé de conflit enseignant : (enseignant, jour, créneau).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FacultyKey(pub FacultyId, pub Day, pub TimeSlotId);

/// Décision atomique : (offre, jour, créneau, salle, enseignant).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub offering: OfferingId,
    pub day: Day,
    pub timeslot: TimeSlotId,
    pub room: RoomId,
    pub faculty: FacultyId,
}

impl Assignment {
    pub fn room_conflict_key(&self) -> RoomKey {
        RoomKey(self.room.clone(), self.day, self.timeslot.clone())
    }
    pub fn faculty_conflict_key(&self) -> FacultyKey {
        FacultyKey(self.faculty.clone(), self.day, self.timeslot.clone())
    }
    pub fn offering_key(&self) -> &OfferingId {
        &self.offering
    }
}
