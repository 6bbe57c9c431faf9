use super::feasibility::Checker;
use super::index::ConstraintIndex;
use super::{GenerateOptions, InputError};
use crate::model::{Assignment, Offering, OfferingId};
use crate::snapshot::Catalog;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Écart de coût en dessous duquel deux états sont considérés à égalité.
const COST_EPSILON: f64 = 1e-9;

/// Meilleur état rencontré : le plus d'offres placées, puis le coût le plus bas.
#[derive(Debug, Clone)]
struct Best {
    branch: Vec<Assignment>,
    placed: usize,
    cost: f64,
}

/// Résultat brut d'une recherche, avant mise en forme en `Timetable`.
#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) unplaced: Vec<OfferingId>,
    pub(crate) total_cost: f64,
    pub(crate) steps: u64,
}

/// Recherche avec retour arrière, offres les plus contraintes d'abord.
pub(crate) struct Search<'c, 'a> {
    catalog: &'c Catalog<'a>,
    checker: Checker<'c, 'a>,
    index: ConstraintIndex,
    kept: Vec<Assignment>,
    order: Vec<&'a Offering>,
    branch: Vec<Assignment>,
    /// Coût total courant de `kept` + `branch`.
    cost: f64,
    budget: u64,
    steps: u64,
    exhausted: bool,
    best: Best,
}

impl<'c, 'a> Search<'c, 'a> {
    /// Prépare la recherche ; `previous` est conservé tel quel (mode réparation).
    pub(crate) fn new(
        catalog: &'c Catalog<'a>,
        opts: &GenerateOptions,
        previous: &[Assignment],
    ) -> Result<Self, InputError> {
        let checker = Checker::new(catalog, opts.weights);
        let mut index = ConstraintIndex::new();
        let mut kept = previous.to_vec();
        sort_canonical(catalog, &mut kept);

        for a in &kept {
            let inconsistent = |reason: String| InputError::InconsistentPrevious {
                offering: a.offering.to_string(),
                reason,
            };
            checker
                .admissible(a)
                .map_err(|why| inconsistent(why.to_string()))?;
            index
                .try_insert(a)
                .map_err(|kind| inconsistent(format!("{kind:?}")))?;
        }

        let (order, hopeless) = placement_order(catalog, &checker, &index);
        if !hopeless.is_empty() {
            debug!(count = hopeless.len(), "offerings without any admissible candidate");
            for o in &hopeless {
                trace!(offering = %o.id, "left unplaced before search");
            }
        }
        let cost = checker.total_cost(&index, &kept);
        let best = Best {
            branch: Vec::new(),
            placed: 0,
            cost,
        };

        Ok(Self {
            catalog,
            checker,
            index,
            kept,
            order,
            branch: Vec::new(),
            cost,
            budget: opts.budget,
            steps: 0,
            exhausted: false,
            best,
        })
    }

    pub(crate) fn run(mut self) -> Outcome {
        debug!(
            to_place = self.order.len(),
            kept = self.index.len(),
            budget = self.budget,
            "starting assignment search"
        );
        let complete = self.place(0, 0);
        debug!(
            complete,
            steps = self.steps,
            exhausted = self.exhausted,
            placed = self.best.placed,
            cost = self.best.cost,
            "assignment search finished"
        );

        let mut assignments = self.kept;
        assignments.extend(self.best.branch);
        sort_canonical(self.catalog, &mut assignments);

        // coût final recalculé sur l'ensemble trié, indépendant de l'ordre de placement
        let mut index = ConstraintIndex::new();
        for a in &assignments {
            let inserted = index.try_insert(a);
            debug_assert!(inserted.is_ok(), "best state holds a conflict");
        }
        let total_cost = self.checker.total_cost(&index, &assignments);

        let placed: BTreeSet<&OfferingId> = assignments.iter().map(|a| &a.offering).collect();
        let unplaced = self
            .catalog
            .offerings
            .keys()
            .filter(|id| !placed.contains(*id))
            .map(|id| (*id).clone())
            .collect();
        Outcome {
            assignments,
            unplaced,
            total_cost,
            steps: self.steps,
        }
    }

    /// Place `order[depth..]` ; `true` dès qu'une solution complète est trouvée.
    fn place(&mut self, depth: usize, skipped: usize) -> bool {
        if depth == self.order.len() {
            return skipped == 0;
        }
        // même en plaçant tout le reste, la branche ne dépasserait pas le meilleur état
        if self.branch.len() + (self.order.len() - depth) < self.best.placed {
            return false;
        }

        let offering = self.order[depth];
        for (cost, a) in self.candidates(offering) {
            if !self.tick() {
                return false;
            }
            let before = self
                .checker
                .others_gap_cost(&self.index, &a.faculty, a.day, &a.offering);
            if self.index.try_insert(&a).is_err() {
                continue;
            }
            let after = self
                .checker
                .others_gap_cost(&self.index, &a.faculty, a.day, &a.offering);
            let saved = self.cost;
            self.cost += cost + after - before;
            self.branch.push(a);
            self.consider_best();

            if self.place(depth + 1, skipped) {
                return true;
            }

            self.cost = saved;
            if let Some(undone) = self.branch.pop() {
                self.index.remove(&undone);
                trace!(offering = %undone.offering, depth, "backtrack");
            }
            if self.exhausted {
                return false;
            }
        }

        if !self.tick() {
            return false;
        }
        trace!(offering = %offering.id, depth, "offering left unplaced on this branch");
        self.place(depth + 1, skipped + 1)
    }

    /// Candidats admissibles de l'offre avec leur coût, du moins coûteux au plus coûteux.
    ///
    /// Le tri est stable : l'ordre d'énumération de [`tuples`] départage les coûts égaux.
    fn candidates(&self, offering: &Offering) -> Vec<(f64, Assignment)> {
        let mut scored: Vec<(f64, Assignment)> = tuples(self.catalog, offering)
            .into_iter()
            .filter_map(|a| {
                let cost = self.checker.evaluate(&self.index, &a).ok()?;
                Some((cost, a))
            })
            .collect();
        scored.sort_by(|x, y| x.0.total_cmp(&y.0));
        scored
    }

    fn tick(&mut self) -> bool {
        if self.steps >= self.budget {
            self.exhausted = true;
            return false;
        }
        self.steps += 1;
        true
    }

    fn consider_best(&mut self) {
        let placed = self.branch.len();
        let better = placed > self.best.placed
            || (placed == self.best.placed && self.cost < self.best.cost - COST_EPSILON);
        if better {
            self.best = Best {
                branch: self.branch.clone(),
                placed,
                cost: self.cost,
            };
        }
    }
}

/// Énumération : jours dans l'ordre canonique, créneaux par heure de début,
/// salles compatibles par capacité croissante, enseignants dans l'ordre déclaré.
fn tuples(catalog: &Catalog<'_>, offering: &Offering) -> Vec<Assignment> {
    let rooms = catalog.rooms_for(offering);
    let mut out = Vec::new();
    for &day in &catalog.days {
        for slot in &catalog.slots {
            for room in &rooms {
                for faculty in &offering.instructors {
                    out.push(Assignment {
                        offering: offering.id.clone(),
                        day,
                        timeslot: slot.id.clone(),
                        room: room.id.clone(),
                        faculty: faculty.clone(),
                    });
                }
            }
        }
    }
    out
}

/// Offres sans affectation, de la plus difficile à la plus facile à placer,
/// et à part celles qu'aucun quadruplet ne peut accueillir.
fn placement_order<'a>(
    catalog: &Catalog<'a>,
    checker: &Checker<'_, 'a>,
    index: &ConstraintIndex,
) -> (Vec<&'a Offering>, Vec<&'a Offering>) {
    let (placeable, hopeless): (Vec<&'a Offering>, Vec<&'a Offering>) = catalog
        .offerings
        .values()
        .copied()
        .filter(|o| index.offering_assignment(&o.id).is_none())
        .partition(|o| {
            tuples(catalog, o)
                .iter()
                .any(|a| checker.evaluate(index, a).is_ok())
        });

    let mut keyed: Vec<(usize, usize, &'a Offering)> = placeable
        .into_iter()
        .map(|o| (catalog.rooms_for(o).len(), free_combinations(catalog, index, o), o))
        .collect();
    keyed.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.id.cmp(&b.2.id))
    });
    (keyed.into_iter().map(|(_, _, o)| o).collect(), hopeless)
}

/// (jour, créneau) encore libres pour les enseignants de l'offre.
fn free_combinations(catalog: &Catalog<'_>, index: &ConstraintIndex, offering: &Offering) -> usize {
    offering
        .instructors
        .iter()
        .filter_map(|id| catalog.faculty(id))
        .map(|member| {
            catalog
                .days
                .iter()
                .flat_map(|&day| catalog.slots.iter().map(move |slot| (day, &slot.id)))
                .filter(|(day, slot)| {
                    !member.is_unavailable(*day, slot)
                        && index.faculty_occupant(*day, slot, &member.id).is_none()
                })
                .count()
        })
        .sum()
}

/// Ordre de présentation : jour, heure de début du créneau, salle, offre.
pub(crate) fn sort_canonical(catalog: &Catalog<'_>, assignments: &mut [Assignment]) {
    let slot_rank = |a: &Assignment| catalog.slot_position(&a.timeslot).unwrap_or(usize::MAX);
    assignments.sort_by(|x, y| {
        x.day
            .cmp(&y.day)
            .then_with(|| slot_rank(x).cmp(&slot_rank(y)))
            .then_with(|| x.timeslot.cmp(&y.timeslot))
            .then_with(|| x.room.cmp(&y.room))
            .then_with(|| x.offering.cmp(&y.offering))
            .then_with(|| x.faculty.cmp(&y.faculty))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Course, CourseId, CourseType, Day, Faculty, FacultyId, Room, TimeSlot, Unavailability,
    };
    use crate::snapshot::Snapshot;
    use chrono::NaiveTime;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn course(id: &str, room_type: Option<&str>) -> Course {
        Course {
            id: CourseId::new(id),
            code: id.to_uppercase(),
            name: String::new(),
            course_type: CourseType::Major,
            department: None,
            theory_credits: 3.0,
            lab_credits: 0.0,
            room_type: room_type.map(str::to_string),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            days: vec![Day::Monday, Day::Tuesday],
            rooms: vec![
                Room::new("hall", 100, None),
                Room::new("lab", 30, Some("Lab")),
                Room::new("room", 30, None),
            ],
            timeslots: vec![
                TimeSlot::new("s1", t(9), t(10)).unwrap(),
                TimeSlot::new("s2", t(10), t(11)).unwrap(),
            ],
            courses: vec![course("c-lab", Some("Lab")), course("c-lec", None)],
            offerings: vec![
                Offering::new("a", "c-lec", "f1"),
                Offering::new("b", "c-lab", "f2"),
                Offering::new("c", "c-lec", "f3"),
            ],
            faculty: vec![
                Faculty::new("f1", "Ada"),
                Faculty::new("f2", "Grace"),
                Faculty::new("f3", "Edsger"),
            ],
            ..Snapshot::default()
        }
    }

    fn ids(order: &[&Offering]) -> Vec<String> {
        order.iter().map(|o| o.id.to_string()).collect()
    }

    #[test]
    fn most_constrained_offerings_come_first() {
        let mut snap = snapshot();
        // f3 ne peut enseigner que le mardi
        snap.faculty[2].unavailable = vec![
            Unavailability {
                day: Day::Monday,
                timeslot: crate::model::TimeSlotId::new("s1"),
            },
            Unavailability {
                day: Day::Monday,
                timeslot: crate::model::TimeSlotId::new("s2"),
            },
        ];
        let cat = snap.validate().unwrap();
        let checker = Checker::new(&cat, GenerateOptions::default().weights);
        let (order, hopeless) = placement_order(&cat, &checker, &ConstraintIndex::new());
        assert!(hopeless.is_empty());
        // b : une seule salle de labo ; c : moins de créneaux libres que a
        assert_eq!(ids(&order), vec!["b", "c", "a"]);
    }

    #[test]
    fn candidates_prefer_tightest_room() {
        let snap = snapshot();
        let cat = snap.validate().unwrap();
        let search = Search::new(&cat, &GenerateOptions::default(), &[]).unwrap();
        let rooms: Vec<String> = search
            .candidates(&snap.offerings[0])
            .iter()
            .take(3)
            .map(|(_, a)| format!("{} {} {}", a.day, a.timeslot, a.room))
            .collect();
        // à coût égal : plus petite capacité d'abord, identifiant ensuite, amphi en dernier
        assert_eq!(rooms, vec!["Mon s1 lab", "Mon s1 room", "Mon s1 hall"]);
    }

    #[test]
    fn search_places_everything_when_possible() {
        let snap = snapshot();
        let cat = snap.validate().unwrap();
        let outcome = Search::new(&cat, &GenerateOptions::default(), &[])
            .unwrap()
            .run();
        assert!(outcome.unplaced.is_empty());
        assert_eq!(outcome.assignments.len(), 3);
    }

    #[test]
    fn backtracks_out_of_greedy_dead_end() {
        // b préfère s2 ; c ne peut avoir lieu qu'en s2 (f3 et f4 absents en s1).
        // Les deux ont la même difficulté estimée, b est placé d'abord en s2 puis défait.
        let blocked = |id: &str, name: &str| Faculty {
            unavailable: vec![Unavailability {
                day: Day::Monday,
                timeslot: crate::model::TimeSlotId::new("s1"),
            }],
            ..Faculty::new(id, name)
        };
        let mut b = Offering::new("b", "c-lec", "f2");
        b.preferences.window = Some(crate::model::TimeWindow {
            start: t(10),
            end: t(11),
        });
        let mut c = Offering::new("c", "c-lec", "f3");
        c.instructors.push(FacultyId::new("f4"));
        let snap = Snapshot {
            days: vec![Day::Monday],
            rooms: vec![Room::new("room", 30, None)],
            timeslots: vec![
                TimeSlot::new("s1", t(9), t(10)).unwrap(),
                TimeSlot::new("s2", t(10), t(11)).unwrap(),
            ],
            courses: vec![course("c-lec", None)],
            offerings: vec![b, c],
            faculty: vec![
                Faculty::new("f2", "Grace"),
                blocked("f3", "Edsger"),
                blocked("f4", "Barbara"),
            ],
            ..Snapshot::default()
        };
        let cat = snap.validate().unwrap();
        let outcome = Search::new(&cat, &GenerateOptions::default(), &[])
            .unwrap()
            .run();
        assert!(outcome.unplaced.is_empty());
        let placed: Vec<String> = outcome
            .assignments
            .iter()
            .map(|a| format!("{} {} {}", a.offering, a.timeslot, a.faculty))
            .collect();
        assert_eq!(placed, vec!["b s1 f2", "c s2 f3"]);
        // b en s2, c sauté, b en s1, c en s2
        assert_eq!(outcome.steps, 4);
    }

    #[test]
    fn offering_without_any_room_is_set_aside_before_search() {
        let mut snap = snapshot();
        snap.courses.push(course("c-chem", Some("Chemistry")));
        snap.offerings.push(Offering::new("d", "c-chem", "f1"));
        let cat = snap.validate().unwrap();
        let (order, hopeless) = placement_order(
            &cat,
            &Checker::new(&cat, GenerateOptions::default().weights),
            &ConstraintIndex::new(),
        );
        assert_eq!(ids(&order), vec!["b", "a", "c"]);
        assert_eq!(ids(&hopeless), vec!["d"]);

        // le reste est complet : la recherche s'arrête sans épuiser le budget
        let outcome = Search::new(&cat, &GenerateOptions::default(), &[])
            .unwrap()
            .run();
        assert_eq!(outcome.assignments.len(), 3);
        assert_eq!(outcome.unplaced, vec![crate::model::OfferingId::new("d")]);
        assert_eq!(outcome.steps, 3);
    }

    #[test]
    fn tiny_budget_still_returns_partial() {
        let snap = snapshot();
        let cat = snap.validate().unwrap();
        let outcome = Search::new(&cat, &GenerateOptions::with_budget(1), &[])
            .unwrap()
            .run();
        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.assignments.len(), 1);
        assert_eq!(outcome.unplaced.len(), 2);
    }

    #[test]
    fn inconsistent_previous_is_rejected() {
        let snap = snapshot();
        let cat = snap.validate().unwrap();
        let clash = |offering: &str| Assignment {
            offering: crate::model::OfferingId::new(offering),
            day: Day::Monday,
            timeslot: crate::model::TimeSlotId::new("s1"),
            room: crate::model::RoomId::new("room"),
            faculty: FacultyId::new(if offering == "a" { "f1" } else { "f3" }),
        };
        let err = Search::new(&cat, &GenerateOptions::default(), &[clash("a"), clash("c")])
            .err()
            .unwrap();
        assert!(matches!(err, InputError::InconsistentPrevious { .. }));
    }
}
