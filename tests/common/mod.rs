#![allow(dead_code)]
use chrono::NaiveTime;
use horaire::{
    Course, CourseId, CourseType, Day, Faculty, Offering, Room, Snapshot, TimeSlot, TimeWindow,
    Timetable,
};
use std::collections::HashSet;

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn course(id: &str, room_type: Option<&str>) -> Course {
    Course {
        id: CourseId::new(id),
        code: id.to_uppercase(),
        name: format!("Course {id}"),
        course_type: if room_type == Some("Lab") {
            CourseType::Lab
        } else {
            CourseType::Major
        },
        department: None,
        theory_credits: 3.0,
        lab_credits: if room_type == Some("Lab") { 1.0 } else { 0.0 },
        room_type: room_type.map(str::to_string),
    }
}

pub fn offering(id: &str, course: &str, faculty: &str, limit: Option<u32>) -> Offering {
    Offering {
        enrollment_limit: limit,
        ..Offering::new(id, course, faculty)
    }
}

/// Trimestre réaliste : 3 jours, 4 créneaux, 3 salles, 5 enseignants, 14 offres.
pub fn term() -> Snapshot {
    let mut offerings = vec![
        offering("alg-1", "alg", "f-ada", Some(40)),
        offering("alg-2", "alg", "f-ada", Some(25)),
        offering("bio-lab-1", "bio-lab", "f-rosalind", Some(20)),
        offering("bio-lab-2", "bio-lab", "f-rosalind", Some(18)),
        offering("chem-1", "chem", "f-marie", Some(30)),
        offering("chem-lab-1", "chem-lab", "f-marie", Some(15)),
        offering("db-1", "db", "f-edgar", Some(45)),
        offering("db-2", "db", "f-edgar", None),
        offering("net-1", "net", "f-vint", Some(28)),
        offering("net-2", "net", "f-vint", Some(28)),
        offering("os-1", "os", "f-edgar", Some(35)),
        offering("phys-1", "phys", "f-marie", Some(50)),
        offering("sec-1", "sec", "f-vint", None),
        offering("stat-1", "stat", "f-ada", Some(22)),
    ];
    offerings[0].preferences.days = vec![Day::Monday];
    offerings[4].preferences.window = Some(TimeWindow {
        start: t(8, 0),
        end: t(10, 0),
    });
    offerings[7].instructors.push(horaire::FacultyId::new("f-vint"));
    offerings[12].preferences.weight = 3.0;
    offerings[12].preferences.days = vec![Day::Wednesday];

    let mut marie = Faculty::new("f-marie", "Marie");
    marie.preferred_days = vec![Day::Tuesday, Day::Wednesday];
    let mut vint = Faculty::new("f-vint", "Vint");
    vint.unavailable = vec![
        horaire::Unavailability {
            day: Day::Monday,
            timeslot: horaire::TimeSlotId::new("s1"),
        },
        horaire::Unavailability {
            day: Day::Monday,
            timeslot: horaire::TimeSlotId::new("s2"),
        },
    ];

    Snapshot {
        term_id: Some("2025-S1".into()),
        days: vec![Day::Monday, Day::Tuesday, Day::Wednesday],
        rooms: vec![
            Room::new("amphi", 60, Some("Lecture")),
            Room::new("b-101", 30, Some("Lecture")),
            Room::new("lab-a", 25, Some("Lab")),
        ],
        timeslots: vec![
            TimeSlot::new("s1", t(8, 0), t(9, 0)).unwrap(),
            TimeSlot::new("s2", t(9, 0), t(10, 0)).unwrap(),
            TimeSlot::new("s3", t(10, 15), t(11, 15)).unwrap(),
            TimeSlot::new("s4", t(13, 0), t(14, 0)).unwrap(),
        ],
        courses: vec![
            course("alg", None),
            course("bio-lab", Some("Lab")),
            course("chem", Some("Lecture")),
            course("chem-lab", Some("Lab")),
            course("db", None),
            course("net", None),
            course("os", Some("Lecture")),
            course("phys", Some("Lecture")),
            course("sec", None),
            course("stat", None),
        ],
        offerings,
        faculty: vec![
            Faculty::new("f-ada", "Ada"),
            Faculty::new("f-edgar", "Edgar"),
            marie,
            Faculty::new("f-rosalind", "Rosalind"),
            vint,
        ],
    }
}

/// Deux offres en concurrence pour l'unique salle et l'unique créneau, même enseignant.
pub fn oversubscribed() -> Snapshot {
    Snapshot {
        days: vec![Day::Monday],
        rooms: vec![Room::new("r1", 30, Some("Lecture"))],
        timeslots: vec![TimeSlot::new("s1", t(9, 0), t(10, 0)).unwrap()],
        courses: vec![course("c1", Some("Lecture"))],
        offerings: vec![
            offering("o1", "c1", "f1", Some(30)),
            offering("o2", "c1", "f1", Some(25)),
        ],
        faculty: vec![Faculty::new("f1", "Ada")],
        ..Snapshot::default()
    }
}

/// Aucune paire ne partage (salle, jour, créneau), (enseignant, jour, créneau) ou offre.
pub fn assert_conflict_free(t: &Timetable) {
    let mut rooms = HashSet::new();
    let mut faculty = HashSet::new();
    let mut offerings = HashSet::new();
    for a in &t.assignments {
        assert!(rooms.insert(a.room_conflict_key()), "room clash {a:?}");
        assert!(faculty.insert(a.faculty_conflict_key()), "faculty clash {a:?}");
        assert!(offerings.insert(a.offering.clone()), "offering twice {a:?}");
    }
    assert!(t.detect_conflicts().is_empty());
}
