//! Core domain types for the Quest Log system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Skills and their cumulative experience
//! - Habits and the experience they grant
//! - The persisted progression snapshot
//! - Results returned by store operations
//!
//! Field names on the serialized types (`abbr`, `expGains`, `skillId`) are
//! part of the persisted and exported format and must not change.

use serde::{Deserialize, Serialize};

// ============================================================================
// Skill Types
// ============================================================================

/// A tracked attribute accumulating experience over time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(rename = "abbr")]
    pub abbreviation: String,
    pub exp: u64,
}

/// Editable fields of a skill; `None` leaves the field unchanged
#[derive(Clone, Debug, Default)]
pub struct SkillUpdate {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
}

// ============================================================================
// Habit Types
// ============================================================================

/// Experience granted to one skill when a habit is completed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpGain {
    #[serde(rename = "skillId")]
    pub skill_id: String,
    pub exp: u64,
}

impl ExpGain {
    pub fn new(skill_id: impl Into<String>, exp: u64) -> Self {
        Self {
            skill_id: skill_id.into(),
            exp,
        }
    }
}

/// A repeatable action that awards experience on completion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(rename = "expGains")]
    pub exp_gains: Vec<ExpGain>,
}

/// Editable fields of a habit; `None` leaves the field unchanged
#[derive(Clone, Debug, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub exp_gains: Option<Vec<ExpGain>>,
}

// ============================================================================
// Snapshot Type
// ============================================================================

/// The complete skills and habits collections at one instant
///
/// This is the unit of persistence, export and import. Ordering of both
/// collections is preserved and only affects display.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProgressionState {
    pub skills: Vec<Skill>,
    pub habits: Vec<Habit>,
}

// ============================================================================
// Completion Result Types
// ============================================================================

/// Experience actually applied to a skill during a completion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedGain {
    /// The skill as it is after the completion
    pub skill: Skill,
    pub exp_awarded: u64,
}

/// A skill whose level increased during a completion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelUp {
    pub skill_id: String,
    pub skill_name: String,
    pub old_level: u32,
    pub new_level: u32,
}

/// Outcome of completing a habit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionResult {
    pub habit_id: String,
    pub habit_name: String,
    /// Gains applied, in the habit's gain order
    pub applied: Vec<AppliedGain>,
    pub level_ups: Vec<LevelUp>,
    /// Skill ids referenced by the habit that no longer exist
    pub skipped: Vec<String>,
}

impl CompletionResult {
    /// True when the completion changed no skill
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn leveled_up(&self) -> bool {
        !self.level_ups.is_empty()
    }
}
