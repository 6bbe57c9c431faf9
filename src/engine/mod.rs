mod feasibility;
mod index;
mod search;
mod types;

pub use types::{
    Conflict, ConflictKind, EngineConfig, GenerateOptions, InputError, Rejection, Weights,
    DEFAULT_BUDGET,
};

use crate::snapshot::Snapshot;
use crate::timetable::Timetable;
use search::Search;
use tracing::info;

/// Génère (ou répare) l'emploi du temps d'un instantané.
///
/// Avec `previous`, les affectations existantes sont conservées telles quelles
/// et seules les offres sans affectation sont placées. Un emploi du temps
/// incomplet n'est pas une erreur : il revient avec `valid = false` et la
/// liste des offres non placées. Seule une entrée malformée (instantané,
/// options, affectations précédentes) produit une `InputError`, avant toute
/// recherche.
pub fn generate(
    snapshot: &Snapshot,
    previous: Option<&Timetable>,
    opts: &GenerateOptions,
) -> Result<Timetable, InputError> {
    opts.validate()?;
    let catalog = snapshot.validate()?;
    let kept = previous.map_or(&[][..], |t| t.assignments.as_slice());

    let outcome = Search::new(&catalog, opts, kept)?.run();
    let timetable = Timetable::new(
        snapshot.term_id.clone(),
        outcome.assignments,
        outcome.unplaced,
        outcome.total_cost,
        outcome.steps,
    );
    info!(
        offerings = snapshot.offerings.len(),
        placed = timetable.placed_count(),
        unplaced = timetable.unplaced.len(),
        valid = timetable.valid,
        steps = timetable.steps,
        "timetable generated"
    );
    Ok(timetable)
}
