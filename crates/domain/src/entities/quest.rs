//! Quests, objectives and per-character quest logs.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CharacterId, ItemId, ObjectiveId, QuestId, WorldId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Available,
    Active,
    Completed,
    Failed,
}

impl Default for QuestStatus {
    fn default() -> Self {
        Self::Available
    }
}

/// One measurable step of a quest.
///
/// `completed` is kept in lockstep with `current >= required`; the only
/// mutation path is [`Objective::apply_progress`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: ObjectiveId,
    pub description: String,
    #[serde(rename = "type")]
    pub objective_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub required: u32,
    pub current: u32,
    pub completed: bool,
}

impl Objective {
    pub fn new(
        description: impl Into<String>,
        objective_type: impl Into<String>,
        target: Option<String>,
        required: u32,
    ) -> Result<Self, DomainError> {
        if required == 0 {
            return Err(DomainError::validation(
                "Objective 'required' must be at least 1",
            ));
        }
        Ok(Self {
            id: ObjectiveId::new(),
            description: description.into(),
            objective_type: objective_type.into(),
            target,
            required,
            current: 0,
            completed: false,
        })
    }

    /// Add progress, clamping at `required` and updating `completed`
    /// atomically. Returns the new `current`.
    pub fn apply_progress(&mut self, delta: u32) -> u32 {
        self.current = (self.current + delta).min(self.required);
        self.completed = self.current >= self.required;
        self.current
    }

    /// Force the objective to its completed state.
    pub fn force_complete(&mut self) {
        self.current = self.required;
        self.completed = true;
    }

    pub fn progress_string(&self) -> String {
        format!("{}/{}", self.current, self.required)
    }
}

/// What completing the quest grants.
///
/// Items go to the completing character's inventory; experience and gold are
/// echoed informationally and not persisted as character fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRewards {
    pub experience: i64,
    pub gold: i64,
    pub items: Vec<ItemId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub world_id: WorldId,
    pub name: String,
    pub description: String,
    pub status: QuestStatus,
    pub objectives: Vec<Objective>,
    pub rewards: QuestRewards,
    /// Quest ids that must be completed before this one can be assigned
    pub prerequisites: Vec<QuestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub giver: Option<CharacterId>,
}

impl Quest {
    pub fn all_objectives_complete(&self) -> bool {
        self.objectives.iter().all(|o| o.completed)
    }

    pub fn objective_mut(&mut self, id: ObjectiveId) -> Option<&mut Objective> {
        self.objectives.iter_mut().find(|o| o.id == id)
    }
}

/// Per-character quest assignment state. A quest id appears in at most one
/// of the three lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLog {
    pub character_id: CharacterId,
    pub active_quests: Vec<QuestId>,
    pub completed_quests: Vec<QuestId>,
    pub failed_quests: Vec<QuestId>,
}

impl QuestLog {
    pub fn empty(character_id: CharacterId) -> Self {
        Self {
            character_id,
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            failed_quests: Vec::new(),
        }
    }

    pub fn contains(&self, quest_id: QuestId) -> bool {
        self.active_quests.contains(&quest_id)
            || self.completed_quests.contains(&quest_id)
            || self.failed_quests.contains(&quest_id)
    }

    /// Move a quest from active to completed.
    pub fn mark_completed(&mut self, quest_id: QuestId) -> Result<(), DomainError> {
        let pos = self
            .active_quests
            .iter()
            .position(|id| *id == quest_id)
            .ok_or_else(|| {
                DomainError::conflict(format!("Quest {quest_id} is not active for this character"))
            })?;
        self.active_quests.remove(pos);
        self.completed_quests.push(quest_id);
        Ok(())
    }

    /// Move a quest from active to failed.
    pub fn mark_failed(&mut self, quest_id: QuestId) -> Result<(), DomainError> {
        let pos = self
            .active_quests
            .iter()
            .position(|id| *id == quest_id)
            .ok_or_else(|| {
                DomainError::conflict(format!("Quest {quest_id} is not active for this character"))
            })?;
        self.active_quests.remove(pos);
        self.failed_quests.push(quest_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_progress_clamps_and_completes() {
        let mut obj = Objective::new("Slay rats", "kill", Some("rat".into()), 3).unwrap();
        assert_eq!(obj.apply_progress(2), 2);
        assert!(!obj.completed);
        assert_eq!(obj.apply_progress(5), 3);
        assert!(obj.completed);
        assert_eq!(obj.progress_string(), "3/3");
    }

    #[test]
    fn test_objective_requires_positive_target() {
        assert!(Objective::new("noop", "misc", None, 0).is_err());
    }

    #[test]
    fn test_quest_log_transitions() {
        let mut log = QuestLog::empty(CharacterId::new());
        let quest = QuestId::new();
        assert!(log.mark_completed(quest).is_err());
        log.active_quests.push(quest);
        log.mark_completed(quest).unwrap();
        assert!(log.active_quests.is_empty());
        assert!(log.completed_quests.contains(&quest));
        assert!(log.contains(quest));
    }
}
