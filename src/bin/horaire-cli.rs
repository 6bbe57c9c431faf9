#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use horaire::{engine::ConflictKind, generate, io, EngineConfig, GenerateOptions};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI du moteur d'emplois du temps
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer (ou réparer) un emploi du temps
    Generate {
        /// Instantané JSON du trimestre
        #[arg(long)]
        snapshot: String,
        /// Emploi du temps existant à compléter
        #[arg(long)]
        previous: Option<String>,
        /// Fichier JSON de configuration (poids, budget)
        #[arg(long)]
        config: Option<String>,
        /// Remplace le budget de la configuration
        #[arg(long)]
        budget: Option<u64>,
        /// Sortie JSON (stdout sinon)
        #[arg(long)]
        out: Option<String>,
        /// Export CSV des entrées
        #[arg(long)]
        csv: Option<String>,
    },

    /// Vérifier un emploi du temps contre son instantané
    Check {
        #[arg(long)]
        snapshot: String,
        #[arg(long)]
        timetable: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Generate {
            snapshot,
            previous,
            config,
            budget,
            out,
            csv,
        } => {
            let snap = io::load_snapshot(&snapshot)?;
            let prev = previous.map(io::load_timetable).transpose()?;
            let cfg = match config {
                Some(path) => io::load_config(path)?,
                None => EngineConfig::default(),
            };
            let mut opts = GenerateOptions::from(cfg);
            if let Some(b) = budget {
                opts.budget = b;
            }

            let timetable = generate(&snap, prev.as_ref(), &opts)
                .with_context(|| format!("invalid input {snapshot}"))?;

            match out {
                Some(path) => io::write_timetable_json(path, &timetable)?,
                None => println!("{}", serde_json::to_string_pretty(&timetable)?),
            }
            if let Some(path) = csv {
                io::export_entries_csv(path, &snap, &timetable)?;
            }

            if timetable.valid {
                eprintln!(
                    "OK: {} offering(s) placed, soft cost {:.2}",
                    timetable.placed_count(),
                    timetable.total_soft_cost
                );
                0
            } else {
                eprintln!(
                    "PARTIAL: {} placed, {} unplaced: {}",
                    timetable.placed_count(),
                    timetable.unplaced.len(),
                    timetable
                        .unplaced
                        .iter()
                        .map(|id| id.as_str())
                        .collect::<Vec<_>>()
                        .join(",")
                );
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Check {
            snapshot,
            timetable,
        } => {
            let snap = io::load_snapshot(&snapshot)?;
            let table = io::load_timetable(&timetable)?;
            // on réinjecte l'emploi du temps comme base : toute affectation invalide est signalée
            let repaired = generate(&snap, Some(&table), &GenerateOptions::with_budget(1));
            let conflicts = table.detect_conflicts();
            if conflicts.is_empty() && repaired.is_ok() {
                println!("OK: no conflicts");
                0
            } else {
                for c in &conflicts {
                    let kind = match c.kind {
                        ConflictKind::RoomConflict => "room",
                        ConflictKind::FacultyConflict => "faculty",
                        ConflictKind::OfferingAlreadyScheduled => "offering",
                    };
                    eprintln!(
                        "{kind}: {} / {} on {} {}",
                        c.offering_a, c.offering_b, c.day, c.timeslot
                    );
                }
                if let Err(err) = repaired {
                    eprintln!("{err}");
                }
                2
            }
        }
    };

    std::process::exit(code);
}
