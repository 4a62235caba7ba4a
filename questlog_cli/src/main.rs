use clap::{Parser, Subcommand};
use questlog_core::store::GainLabel;
use questlog_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "questlog")]
#[command(about = "Skill and habit progression tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show skills and habits (default)
    Status,

    /// Manage skills
    Skill {
        #[command(subcommand)]
        action: SkillAction,
    },

    /// Manage habits
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },

    /// Complete a habit and award its exp
    Complete {
        /// Habit id
        id: String,
    },

    /// Export all skills and habits to a JSON document
    Export {
        /// Output file (defaults to the configured export file name)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Write the document to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Replace all skills and habits with an exported document
    Import {
        /// Document to import
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum SkillAction {
    /// List skills with their levels
    List,

    /// Add a new skill
    Add {
        #[arg(long)]
        name: String,

        /// Short label, e.g. STR
        #[arg(long)]
        abbr: String,
    },

    /// Rename a skill or change its abbreviation
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        abbr: Option<String>,
    },

    /// Delete a skill and remove it from every habit
    Delete { id: String },
}

#[derive(Subcommand)]
enum HabitAction {
    /// List habits with their exp gains
    List,

    /// Add a new habit
    Add {
        #[arg(long)]
        name: String,

        /// Exp gain as SKILL_ID=EXP (repeatable)
        #[arg(long = "gain", value_parser = parse_gain)]
        gains: Vec<ExpGain>,
    },

    /// Edit a habit's name or replace its gains
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Replacement exp gain as SKILL_ID=EXP (repeatable)
        #[arg(long = "gain", value_parser = parse_gain)]
        gains: Vec<ExpGain>,

        /// Remove every exp gain from the habit
        #[arg(long, conflicts_with = "gains")]
        clear_gains: bool,
    },

    /// Delete a habit
    Delete { id: String },
}

fn main() -> Result<()> {
    // Initialize logging
    questlog_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let snapshots = SnapshotStore::new(&data_dir);

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&snapshots, &config),
        Some(Commands::Skill { action }) => cmd_skill(&snapshots, &config, action),
        Some(Commands::Habit { action }) => cmd_habit(&snapshots, action),
        Some(Commands::Complete { id }) => cmd_complete(&snapshots, &id),
        Some(Commands::Export { output, stdout }) => {
            cmd_export(&snapshots, &config, output, stdout)
        }
        Some(Commands::Import { path }) => cmd_import(&snapshots, &path),
    }
}

fn cmd_status(snapshots: &SnapshotStore, config: &Config) -> Result<()> {
    let store = ProgressionStore::new(snapshots.load()?);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  ADVENTURE LOG");
    println!("╰─────────────────────────────────────────╯");
    println!("\nSkills");
    display_skills(&store, config.display.bar_width);
    println!("\nHabits");
    display_habits(&store);
    println!();

    Ok(())
}

fn cmd_skill(snapshots: &SnapshotStore, config: &Config, action: SkillAction) -> Result<()> {
    match action {
        SkillAction::List => {
            let store = ProgressionStore::new(snapshots.load()?);
            display_skills(&store, config.display.bar_width);
        }
        SkillAction::Add { name, abbr } => {
            let skill = snapshots.update(|store| store.add_skill(&name, &abbr))?;
            println!("✓ Added skill {} ({}) [id: {}]", skill.name, skill.abbreviation, skill.id);
        }
        SkillAction::Edit { id, name, abbr } => {
            let update = SkillUpdate {
                name,
                abbreviation: abbr,
            };
            let skill = snapshots.update(|store| store.edit_skill(&id, update))?;
            println!("✓ Updated skill {} ({})", skill.name, skill.abbreviation);
        }
        SkillAction::Delete { id } => {
            let skill = snapshots.update(|store| store.delete_skill(&id))?;
            println!("✓ Deleted skill {}", skill.name);
        }
    }
    Ok(())
}

fn cmd_habit(snapshots: &SnapshotStore, action: HabitAction) -> Result<()> {
    match action {
        HabitAction::List => {
            let store = ProgressionStore::new(snapshots.load()?);
            display_habits(&store);
        }
        HabitAction::Add { name, gains } => {
            let habit = snapshots.update(|store| store.add_habit(&name, gains))?;
            println!("✓ Added habit {} [id: {}]", habit.name, habit.id);
        }
        HabitAction::Edit {
            id,
            name,
            gains,
            clear_gains,
        } => {
            let exp_gains = if clear_gains {
                Some(Vec::new())
            } else if gains.is_empty() {
                None
            } else {
                Some(gains)
            };
            let update = HabitUpdate { name, exp_gains };
            let habit = snapshots.update(|store| store.edit_habit(&id, update))?;
            println!("✓ Updated habit {}", habit.name);
        }
        HabitAction::Delete { id } => {
            let habit = snapshots.update(|store| store.delete_habit(&id))?;
            println!("✓ Deleted habit {}", habit.name);
        }
    }
    Ok(())
}

fn cmd_complete(snapshots: &SnapshotStore, id: &str) -> Result<()> {
    let result = snapshots.update(|store| store.complete_habit(id))?;

    if result.is_noop() {
        println!("\nCompleted {}, but no skills gained EXP.", result.habit_name);
    } else {
        let gained = result
            .applied
            .iter()
            .map(|a| format!("{} {}", a.exp_awarded, a.skill.abbreviation))
            .collect::<Vec<_>>()
            .join(", ");
        println!("\n✓ Completed {} and gained {} EXP!", result.habit_name, gained);
    }

    for level_up in &result.level_ups {
        println!(
            "  ★ {} leveled up to {}!",
            level_up.skill_name, level_up.new_level
        );
    }

    if !result.skipped.is_empty() {
        eprintln!(
            "Skipped {} exp gain(s) referencing deleted skills: {}",
            result.skipped.len(),
            result.skipped.join(", ")
        );
    }

    Ok(())
}

fn cmd_export(
    snapshots: &SnapshotStore,
    config: &Config,
    output: Option<PathBuf>,
    stdout: bool,
) -> Result<()> {
    let state = snapshots.load()?;
    let document = serialize_with_timestamp(&state, chrono::Utc::now(), config.export.pretty)?;

    if stdout {
        println!("{}", document);
        return Ok(());
    }

    let path = output.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, document)?;
    tracing::info!("Exported snapshot to {:?}", path);

    println!(
        "✓ Exported {} skills and {} habits",
        state.skills.len(),
        state.habits.len()
    );
    println!("  File: {}", path.display());
    Ok(())
}

fn cmd_import(snapshots: &SnapshotStore, path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)?;

    let state = snapshots.update(|store| {
        store.import_document(&contents)?;
        Ok(store.state().clone())
    })?;

    println!(
        "✓ Imported {} skills and {} habits",
        state.skills.len(),
        state.habits.len()
    );

    let issues = state.validate();
    if !issues.is_empty() {
        eprintln!("Imported data has {} issue(s):", issues.len());
        for issue in issues {
            eprintln!("  - {}", issue);
        }
    }

    Ok(())
}

fn display_skills(store: &ProgressionStore, bar_width: usize) {
    if store.skills().is_empty() {
        println!("  (no skills)");
        return;
    }

    for skill in store.skills() {
        let info = level_of(skill.exp);
        println!(
            "  {} ({})  Lvl {}  {}  {}/{} exp  ({} total)  [id: {}]",
            skill.name,
            skill.abbreviation,
            info.level,
            progress_bar(info.progress, bar_width),
            info.exp_into_level,
            info.exp_for_next_level,
            skill.exp,
            skill.id
        );
    }
}

fn display_habits(store: &ProgressionStore) {
    if store.habits().is_empty() {
        println!("  (no habits)");
        return;
    }

    for habit in store.habits() {
        println!(
            "  {}  EXP Gain: {}  [id: {}]",
            habit.name,
            format_gains(&store.describe_gains(habit)),
            habit.id
        );
    }
}

fn format_gains(labels: &[GainLabel]) -> String {
    if labels.is_empty() {
        return "none".into();
    }
    labels
        .iter()
        .map(|g| format!("{} {}", g.exp, g.label))
        .collect::<Vec<_>>()
        .join(", ")
}

fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress * width as f64).floor() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn parse_gain(raw: &str) -> std::result::Result<ExpGain, String> {
    let (skill_id, exp) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SKILL_ID=EXP, got '{}'", raw))?;

    let skill_id = skill_id.trim();
    if skill_id.is_empty() {
        return Err(format!("missing skill id in '{}'", raw));
    }

    let exp = exp
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid exp in '{}': {}", raw, e))?;

    Ok(ExpGain::new(skill_id, exp))
}
