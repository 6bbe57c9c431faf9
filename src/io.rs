use crate::engine::EngineConfig;
use crate::snapshot::Snapshot;
use crate::timetable::Timetable;
use anyhow::{bail, Context};
use csv::WriterBuilder;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Charge un instantané JSON.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> anyhow::Result<Snapshot> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing snapshot {}", path.display()))
}

/// Charge un emploi du temps JSON (point de départ d'une réparation).
pub fn load_timetable<P: AsRef<Path>>(path: P) -> anyhow::Result<Timetable> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing timetable {}", path.display()))
}

/// Charge la configuration moteur ; les champs absents gardent leur valeur par défaut.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<EngineConfig> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: EngineConfig = serde_json::from_slice(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    if cfg.budget == 0 {
        bail!("config {}: budget must be positive", path.display());
    }
    cfg.weights
        .validate()
        .with_context(|| format!("config {}", path.display()))?;
    Ok(cfg)
}

/// Écrit l'emploi du temps en JSON de manière atomique (fichier temporaire + renommage).
pub fn write_timetable_json<P: AsRef<Path>>(path: P, timetable: &Timetable) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_vec_pretty(timetable)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).with_context(|| "atomic rename")?;
    Ok(())
}

/// Lignes d'entrée d'emploi du temps :
/// header `term_id,day,timeslot_id,start,end,offering_id,room_id,faculty_id`
pub fn write_entries_csv<W: Write>(
    out: W,
    snapshot: &Snapshot,
    timetable: &Timetable,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record([
        "term_id",
        "day",
        "timeslot_id",
        "start",
        "end",
        "offering_id",
        "room_id",
        "faculty_id",
    ])?;
    let term = timetable.term_id.as_deref().unwrap_or("");
    for a in &timetable.assignments {
        let slot = snapshot
            .timeslots
            .iter()
            .find(|s| s.id == a.timeslot)
            .with_context(|| format!("unknown timeslot {} in timetable", a.timeslot))?;
        let start = slot.start.format("%H:%M").to_string();
        let end = slot.end.format("%H:%M").to_string();
        w.write_record([
            term,
            a.day.short_name(),
            a.timeslot.as_str(),
            start.as_str(),
            end.as_str(),
            a.offering.as_str(),
            a.room.as_str(),
            a.faculty.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des entrées vers un fichier.
pub fn export_entries_csv<P: AsRef<Path>>(
    path: P,
    snapshot: &Snapshot,
    timetable: &Timetable,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_entries_csv(file, snapshot, timetable)
}
