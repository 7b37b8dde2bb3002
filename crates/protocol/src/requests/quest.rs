//! Quest lifecycle requests.

use serde::{Deserialize, Serialize};

use questwright_domain::{CharacterId, DomainError, ItemId, ObjectiveId, QuestId, WorldId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveSpec {
    pub description: String,
    #[serde(rename = "type", default = "default_objective_type")]
    pub objective_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default = "default_required")]
    pub required: u32,
}

fn default_objective_type() -> String {
    "misc".to_string()
}

fn default_required() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsSpec {
    #[serde(default)]
    pub experience: i64,
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub items: Vec<ItemId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestRequest {
    pub world_id: WorldId,
    pub name: String,
    pub description: String,
    pub objectives: Vec<ObjectiveSpec>,
    #[serde(default)]
    pub rewards: RewardsSpec,
    #[serde(default)]
    pub prerequisites: Vec<QuestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub giver: Option<CharacterId>,
}

impl CreateQuestRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("quest name cannot be empty"));
        }
        if self.objectives.is_empty() {
            return Err(DomainError::validation(
                "a quest requires at least one objective",
            ));
        }
        for objective in &self.objectives {
            if objective.required == 0 {
                return Err(DomainError::validation(
                    "objective 'required' must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRef {
    pub quest_id: QuestId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuestsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_id: Option<WorldId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignQuestRequest {
    pub quest_id: QuestId,
    pub character_id: CharacterId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateObjectiveRequest {
    pub quest_id: QuestId,
    pub objective_id: ObjectiveId,
    /// Progress delta added to `current`
    #[serde(default = "default_required")]
    pub progress: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteObjectiveRequest {
    pub quest_id: QuestId,
    pub objective_id: ObjectiveId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteQuestRequest {
    pub quest_id: QuestId,
    pub character_id: CharacterId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetQuestLogRequest {
    pub character_id: CharacterId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_quest_requires_objectives() {
        let request = CreateQuestRequest {
            world_id: WorldId::new(),
            name: "Rats in the cellar".into(),
            description: "Clear them out".into(),
            objectives: vec![],
            rewards: RewardsSpec::default(),
            prerequisites: vec![],
            giver: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_objective_defaults() {
        let spec: ObjectiveSpec =
            serde_json::from_str(r#"{"description": "Slay 3 rats"}"#).unwrap();
        assert_eq!(spec.required, 1);
        assert_eq!(spec.objective_type, "misc");
    }
}
