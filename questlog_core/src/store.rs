//! Progression store owning the canonical skill and habit collections.
//!
//! Every mutation validates its input completely before touching state, so a
//! rejected operation leaves the store exactly as it was. Deleting a skill
//! prunes it from every habit's gains, so no habit created through the store
//! references a missing skill. Documents loaded through
//! [`ProgressionStore::replace_state`] may still carry dangling references;
//! those are skipped at completion and shown as "Unknown" by
//! [`ProgressionStore::describe_gains`].

use crate::leveling::level_of;
use crate::{
    AppliedGain, CompletionResult, Error, ExpGain, Habit, HabitUpdate, LevelUp, ProgressionState,
    Result, Skill, SkillUpdate,
};
use std::collections::HashSet;
use uuid::Uuid;

/// Label shown for a gain whose skill no longer exists
pub const UNKNOWN_SKILL_LABEL: &str = "Unknown";

/// Display form of a single habit gain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GainLabel {
    pub exp: u64,
    /// Skill abbreviation, or [`UNKNOWN_SKILL_LABEL`] for a stale reference
    pub label: String,
}

/// Owner of the progression state
#[derive(Clone, Debug, Default)]
pub struct ProgressionStore {
    state: ProgressionState,
}

impl ProgressionStore {
    pub fn new(state: ProgressionState) -> Self {
        Self { state }
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn skills(&self) -> &[Skill] {
        &self.state.skills
    }

    pub fn habits(&self) -> &[Habit] {
        &self.state.habits
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.state.skills.iter().find(|s| s.id == id)
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.state.habits.iter().find(|h| h.id == id)
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn into_state(self) -> ProgressionState {
        self.state
    }

    // ========================================================================
    // Skill operations
    // ========================================================================

    /// Add a new skill with zero exp
    pub fn add_skill(&mut self, name: &str, abbreviation: &str) -> Result<Skill> {
        let name = required("Skill name", name)?;
        let abbreviation = required("Skill abbreviation", abbreviation)?;

        let skill = Skill {
            id: self.fresh_id(),
            name,
            abbreviation,
            exp: 0,
        };
        self.state.skills.push(skill.clone());

        tracing::debug!("Added skill {} ({})", skill.id, skill.name);
        Ok(skill)
    }

    /// Rename a skill or change its abbreviation; exp is never touched
    pub fn edit_skill(&mut self, id: &str, update: SkillUpdate) -> Result<Skill> {
        let index = self
            .skill_index(id)
            .ok_or_else(|| Error::skill_not_found(id))?;

        let name = update
            .name
            .as_deref()
            .map(|n| required("Skill name", n))
            .transpose()?;
        let abbreviation = update
            .abbreviation
            .as_deref()
            .map(|a| required("Skill abbreviation", a))
            .transpose()?;

        let skill = &mut self.state.skills[index];
        if let Some(name) = name {
            skill.name = name;
        }
        if let Some(abbreviation) = abbreviation {
            skill.abbreviation = abbreviation;
        }

        tracing::debug!("Edited skill {}", id);
        Ok(skill.clone())
    }

    /// Delete a skill and prune it from every habit's gains
    pub fn delete_skill(&mut self, id: &str) -> Result<Skill> {
        let index = self
            .skill_index(id)
            .ok_or_else(|| Error::skill_not_found(id))?;

        let removed = self.state.skills.remove(index);

        // Imported documents may repeat an id; keep gains while one remains.
        if self.skill_index(id).is_some() {
            tracing::debug!("Deleted one of several skills with id {}", id);
            return Ok(removed);
        }

        let mut pruned = 0;
        for habit in &mut self.state.habits {
            let before = habit.exp_gains.len();
            habit.exp_gains.retain(|gain| gain.skill_id != id);
            pruned += before - habit.exp_gains.len();
        }

        tracing::debug!(
            "Deleted skill {} and pruned {} habit gain(s)",
            id,
            pruned
        );
        Ok(removed)
    }

    // ========================================================================
    // Habit operations
    // ========================================================================

    pub fn add_habit(&mut self, name: &str, exp_gains: Vec<ExpGain>) -> Result<Habit> {
        let name = required("Habit name", name)?;
        self.validate_gains(&exp_gains)?;

        let habit = Habit {
            id: self.fresh_id(),
            name,
            exp_gains,
        };
        self.state.habits.push(habit.clone());

        tracing::debug!("Added habit {} ({})", habit.id, habit.name);
        Ok(habit)
    }

    pub fn edit_habit(&mut self, id: &str, update: HabitUpdate) -> Result<Habit> {
        let index = self
            .habit_index(id)
            .ok_or_else(|| Error::habit_not_found(id))?;

        let name = update
            .name
            .as_deref()
            .map(|n| required("Habit name", n))
            .transpose()?;
        if let Some(ref gains) = update.exp_gains {
            self.validate_gains(gains)?;
        }

        let habit = &mut self.state.habits[index];
        if let Some(name) = name {
            habit.name = name;
        }
        if let Some(gains) = update.exp_gains {
            habit.exp_gains = gains;
        }

        tracing::debug!("Edited habit {}", id);
        Ok(habit.clone())
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<Habit> {
        let index = self
            .habit_index(id)
            .ok_or_else(|| Error::habit_not_found(id))?;

        let removed = self.state.habits.remove(index);
        tracing::debug!("Deleted habit {}", id);
        Ok(removed)
    }

    /// Award a habit's exp to its skills as a single batch
    ///
    /// Gains whose skill no longer exists are skipped and reported in
    /// [`CompletionResult::skipped`]. When a habit lists the same skill more
    /// than once, only the first gain for that skill is awarded.
    pub fn complete_habit(&mut self, id: &str) -> Result<CompletionResult> {
        let habit = self
            .habit(id)
            .ok_or_else(|| Error::habit_not_found(id))?
            .clone();

        // Plan every increment against the current state before writing any.
        let mut planned: Vec<(usize, u64)> = Vec::new();
        let mut skipped = Vec::new();
        for gain in &habit.exp_gains {
            match self.skill_index(&gain.skill_id) {
                Some(index) => {
                    if planned.iter().all(|(i, _)| *i != index) {
                        planned.push((index, gain.exp));
                    }
                }
                None => {
                    tracing::debug!(
                        "Habit {} references missing skill {}, skipping",
                        habit.id,
                        gain.skill_id
                    );
                    skipped.push(gain.skill_id.clone());
                }
            }
        }

        let mut applied = Vec::with_capacity(planned.len());
        let mut level_ups = Vec::new();
        for (index, awarded) in planned {
            let skill = &mut self.state.skills[index];
            let old_level = level_of(skill.exp).level;
            skill.exp = skill.exp.saturating_add(awarded);
            let new_level = level_of(skill.exp).level;

            if new_level > old_level {
                level_ups.push(LevelUp {
                    skill_id: skill.id.clone(),
                    skill_name: skill.name.clone(),
                    old_level,
                    new_level,
                });
            }
            applied.push(AppliedGain {
                skill: skill.clone(),
                exp_awarded: awarded,
            });
        }

        tracing::debug!(
            "Completed habit {}: {} gain(s) applied, {} level-up(s), {} skipped",
            habit.id,
            applied.len(),
            level_ups.len(),
            skipped.len()
        );

        Ok(CompletionResult {
            habit_id: habit.id,
            habit_name: habit.name,
            applied,
            level_ups,
            skipped,
        })
    }

    // ========================================================================
    // Whole-state operations
    // ========================================================================

    /// Replace the entire state without per-item validation
    pub fn replace_state(&mut self, state: ProgressionState) {
        tracing::debug!(
            "Replacing state: {} skill(s), {} habit(s)",
            state.skills.len(),
            state.habits.len()
        );
        self.state = state;
    }

    /// Parse an exported document and replace the state with it
    ///
    /// On a format error the current state is left untouched.
    pub fn import_document(&mut self, document: &str) -> Result<()> {
        let state = crate::codec::deserialize(document)?;
        self.replace_state(state);
        Ok(())
    }

    /// Resolve a habit's gains to display labels
    pub fn describe_gains(&self, habit: &Habit) -> Vec<GainLabel> {
        habit
            .exp_gains
            .iter()
            .map(|gain| GainLabel {
                exp: gain.exp,
                label: self
                    .skill(&gain.skill_id)
                    .map(|s| s.abbreviation.clone())
                    .unwrap_or_else(|| UNKNOWN_SKILL_LABEL.to_string()),
            })
            .collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn skill_index(&self, id: &str) -> Option<usize> {
        self.state.skills.iter().position(|s| s.id == id)
    }

    fn habit_index(&self, id: &str) -> Option<usize> {
        self.state.habits.iter().position(|h| h.id == id)
    }

    fn validate_gains(&self, gains: &[ExpGain]) -> Result<()> {
        for gain in gains {
            if self.skill(&gain.skill_id).is_none() {
                return Err(Error::Validation(format!(
                    "Habit gain references non-existent skill '{}'",
                    gain.skill_id
                )));
            }
            if gain.exp == 0 {
                return Err(Error::Validation(format!(
                    "Habit gain for skill '{}' must award positive exp",
                    gain.skill_id
                )));
            }
        }
        Ok(())
    }

    /// Generate an id not used by any skill or habit
    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.skill(&id).is_none() && self.habit(&id).is_none() {
                return id;
            }
        }
    }
}

/// Trim a required text field, rejecting empty values
fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

impl ProgressionState {
    /// Check the state for integrity problems
    ///
    /// Returns a list of human-readable issues (empty when consistent).
    /// Store mutations never introduce these, but an imported document may.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut skill_ids = HashSet::new();
        for skill in &self.skills {
            if skill.id.is_empty() {
                errors.push("Skill has empty ID".to_string());
            }
            if !skill_ids.insert(skill.id.as_str()) {
                errors.push(format!("Duplicate skill ID '{}'", skill.id));
            }
            if skill.name.trim().is_empty() {
                errors.push(format!("Skill '{}' has empty name", skill.id));
            }
        }

        let mut habit_ids = HashSet::new();
        for habit in &self.habits {
            if !habit_ids.insert(habit.id.as_str()) {
                errors.push(format!("Duplicate habit ID '{}'", habit.id));
            }
            for gain in &habit.exp_gains {
                if !skill_ids.contains(gain.skill_id.as_str()) {
                    errors.push(format!(
                        "Habit '{}' references non-existent skill '{}'",
                        habit.id, gain.skill_id
                    ));
                }
            }
        }

        errors
    }
}
