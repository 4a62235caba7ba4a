//! Built-in starter skills and habits.
//!
//! Used whenever no persisted snapshot is available.

use crate::types::*;
use once_cell::sync::Lazy;

/// Cached starter state - built once and cloned on demand
static DEFAULT_STATE: Lazy<ProgressionState> = Lazy::new(build_default_state);

/// Get a reference to the cached starter state
pub fn get_default_state() -> &'static ProgressionState {
    &DEFAULT_STATE
}

/// Builds the starter state: four skills at zero exp and four habits
pub fn build_default_state() -> ProgressionState {
    let skills = vec![
        starter_skill("1", "Strength", "STR"),
        starter_skill("2", "Stealth", "STL"),
        starter_skill("3", "Intellect", "INT"),
        starter_skill("4", "Alchemy", "ALC"),
    ];

    let habits = vec![
        Habit {
            id: "1".into(),
            name: "Exercise for 30 minutes".into(),
            exp_gains: vec![ExpGain::new("1", 50)],
        },
        Habit {
            id: "2".into(),
            name: "Read a book chapter".into(),
            exp_gains: vec![ExpGain::new("3", 30)],
        },
        Habit {
            id: "3".into(),
            name: "Practice meditation".into(),
            exp_gains: vec![ExpGain::new("2", 20), ExpGain::new("3", 20)],
        },
        Habit {
            id: "4".into(),
            name: "Study a new topic".into(),
            exp_gains: vec![ExpGain::new("3", 40), ExpGain::new("4", 20)],
        },
    ];

    ProgressionState { skills, habits }
}

fn starter_skill(id: &str, name: &str, abbreviation: &str) -> Skill {
    Skill {
        id: id.into(),
        name: name.into(),
        abbreviation: abbreviation.into(),
        exp: 0,
    }
}
