//! Quest engine: lifecycle, objective progress, prerequisite chains and
//! reward grants.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use questwright_domain::entities::{Objective, Quest, QuestRewards, QuestStatus};
use questwright_domain::{CharacterId, DomainEvent, ItemId, ObjectiveId, QuestId, WorldId};
use questwright_engine_ports::outbound::{
    AuditLogPort, CharacterRepositoryPort, EventBusPort, ItemRepositoryPort, QuestRepositoryPort,
};
use questwright_protocol::requests::quest::CreateQuestRequest;

use crate::application::error::ToolError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletionResult {
    pub quest_id: QuestId,
    pub character_id: CharacterId,
    /// Echoed informationally; not persisted as character fields
    pub experience_awarded: i64,
    pub gold_awarded: i64,
    pub items_granted: Vec<ItemId>,
    /// Reward item ids missing from the item table; noted, never blocking
    pub items_missing: Vec<ItemId>,
}

/// A hydrated quest log: ids resolved to quests with progress strings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLogView {
    pub character_id: CharacterId,
    pub active: Vec<QuestProgressView>,
    pub completed: Vec<QuestProgressView>,
    pub failed: Vec<QuestProgressView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgressView {
    pub quest_id: QuestId,
    pub name: String,
    pub objectives: Vec<String>,
}

pub struct QuestService {
    quests: Arc<dyn QuestRepositoryPort>,
    characters: Arc<dyn CharacterRepositoryPort>,
    items: Arc<dyn ItemRepositoryPort>,
    audit: Arc<dyn AuditLogPort>,
    events: Arc<dyn EventBusPort>,
}

impl QuestService {
    pub fn new(
        quests: Arc<dyn QuestRepositoryPort>,
        characters: Arc<dyn CharacterRepositoryPort>,
        items: Arc<dyn ItemRepositoryPort>,
        audit: Arc<dyn AuditLogPort>,
        events: Arc<dyn EventBusPort>,
    ) -> Self {
        Self {
            quests,
            characters,
            items,
            audit,
            events,
        }
    }

    fn publish_background(&self, event: DomainEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(err) = events.publish(event).await {
                tracing::warn!(error = %err, "Event publication failed");
            }
        });
    }

    pub async fn create(&self, request: CreateQuestRequest) -> Result<Quest, ToolError> {
        request.validate()?;

        let objectives = request
            .objectives
            .iter()
            .map(|spec| {
                Objective::new(
                    spec.description.clone(),
                    spec.objective_type.clone(),
                    spec.target.clone(),
                    spec.required,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let quest = Quest {
            id: QuestId::new(),
            world_id: request.world_id,
            name: request.name,
            description: request.description,
            status: QuestStatus::Available,
            objectives,
            rewards: QuestRewards {
                experience: request.rewards.experience,
                gold: request.rewards.gold,
                items: request.rewards.items,
            },
            prerequisites: request.prerequisites,
            giver: request.giver,
        };
        self.reject_prerequisite_cycle(&quest).await?;
        self.quests.create(&quest).await?;

        self.audit
            .append(
                "quest.create",
                None,
                Some(&quest.id.to_string()),
                json!({"name": quest.name, "objectives": quest.objectives.len()}),
            )
            .await?;
        info!(quest = %quest.id, "Quest created");
        Ok(quest)
    }

    /// Walk the prerequisite graph from this quest; revisiting it means the
    /// new edges close a cycle.
    async fn reject_prerequisite_cycle(&self, quest: &Quest) -> Result<(), ToolError> {
        let mut seen: HashSet<QuestId> = HashSet::new();
        let mut frontier = quest.prerequisites.clone();
        while let Some(next) = frontier.pop() {
            if next == quest.id {
                return Err(ToolError::Invariant(
                    "Quest prerequisites form a cycle".to_string(),
                ));
            }
            if !seen.insert(next) {
                continue;
            }
            if let Some(prerequisite) = self.quests.find_by_id(next).await? {
                frontier.extend(prerequisite.prerequisites);
            }
        }
        Ok(())
    }

    pub async fn get(&self, quest_id: QuestId) -> Result<Quest, ToolError> {
        self.quests
            .find_by_id(quest_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Quest",
                id: quest_id.to_string(),
            })
    }

    pub async fn list(&self, world_id: Option<WorldId>) -> Result<Vec<Quest>, ToolError> {
        Ok(self.quests.list(world_id).await?)
    }

    /// Assign a quest: character and quest must exist, the quest must not
    /// already be active or completed for the character, and every
    /// prerequisite must be in the character's completed list.
    pub async fn assign(
        &self,
        quest_id: QuestId,
        character_id: CharacterId,
    ) -> Result<(), ToolError> {
        let quest = self.get(quest_id).await?;
        if self.characters.find_by_id(character_id).await?.is_none() {
            return Err(ToolError::NotFound {
                entity_type: "Character",
                id: character_id.to_string(),
            });
        }

        let mut log = self.quests.quest_log(character_id).await?;
        if log.active_quests.contains(&quest_id) {
            return Err(ToolError::Invariant(format!(
                "Quest '{}' is already active for this character",
                quest.name
            )));
        }
        if log.completed_quests.contains(&quest_id) {
            return Err(ToolError::Invariant(format!(
                "Quest '{}' is already completed by this character",
                quest.name
            )));
        }

        let missing: Vec<QuestId> = quest
            .prerequisites
            .iter()
            .filter(|id| !log.completed_quests.contains(id))
            .copied()
            .collect();
        if !missing.is_empty() {
            let mut names = Vec::new();
            for id in &missing {
                let name = self
                    .quests
                    .find_by_id(*id)
                    .await?
                    .map(|q| q.name)
                    .unwrap_or_else(|| id.to_string());
                names.push(name);
            }
            return Err(ToolError::Invariant(format!(
                "Prerequisite quest(s) not completed: {}",
                names.join(", ")
            )));
        }

        log.active_quests.push(quest_id);
        self.quests.save_quest_log(&log).await?;

        self.audit
            .append(
                "quest.assign",
                Some(&character_id.to_string()),
                Some(&quest_id.to_string()),
                json!({"name": quest.name}),
            )
            .await?;
        self.publish_background(DomainEvent::QuestAssigned {
            quest_id,
            character_id,
        });
        Ok(())
    }

    /// Add progress to an objective, clamped at its requirement.
    pub async fn update_objective(
        &self,
        quest_id: QuestId,
        objective_id: ObjectiveId,
        progress: u32,
    ) -> Result<Objective, ToolError> {
        let mut quest = self.get(quest_id).await?;
        let objective = quest
            .objective_mut(objective_id)
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Objective",
                id: objective_id.to_string(),
            })?;
        objective.apply_progress(progress);
        let snapshot = objective.clone();
        self.quests.update(&quest).await?;

        self.audit
            .append(
                "quest.update_objective",
                None,
                Some(&quest_id.to_string()),
                json!({"objectiveId": objective_id, "progress": snapshot.progress_string()}),
            )
            .await?;
        self.publish_background(DomainEvent::ObjectiveUpdated {
            quest_id,
            objective_progress: snapshot.progress_string(),
            completed: snapshot.completed,
        });
        Ok(snapshot)
    }

    /// Jump an objective straight to completion.
    pub async fn complete_objective(
        &self,
        quest_id: QuestId,
        objective_id: ObjectiveId,
    ) -> Result<Objective, ToolError> {
        let mut quest = self.get(quest_id).await?;
        let objective = quest
            .objective_mut(objective_id)
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Objective",
                id: objective_id.to_string(),
            })?;
        objective.force_complete();
        let snapshot = objective.clone();
        self.quests.update(&quest).await?;

        self.audit
            .append(
                "quest.complete_objective",
                None,
                Some(&quest_id.to_string()),
                json!({"objectiveId": objective_id}),
            )
            .await?;
        Ok(snapshot)
    }

    /// Complete a quest: every objective must be done; rewards are granted
    /// once, inside the repository's completion transaction.
    pub async fn complete(
        &self,
        quest_id: QuestId,
        character_id: CharacterId,
    ) -> Result<QuestCompletionResult, ToolError> {
        let mut quest = self.get(quest_id).await?;
        if !quest.all_objectives_complete() {
            let open: Vec<String> = quest
                .objectives
                .iter()
                .filter(|o| !o.completed)
                .map(|o| format!("{} ({})", o.description, o.progress_string()))
                .collect();
            return Err(ToolError::Conflict(format!(
                "Objectives still open: {}",
                open.join("; ")
            )));
        }

        let mut log = self.quests.quest_log(character_id).await?;
        if log.completed_quests.contains(&quest_id) {
            return Err(ToolError::Conflict(format!(
                "Quest '{}' is already completed by this character",
                quest.name
            )));
        }
        log.mark_completed(quest_id)?;

        // Missing reward items are noted, never blocking
        let mut items_granted = Vec::new();
        let mut items_missing = Vec::new();
        for item_id in &quest.rewards.items {
            if self.items.find_by_id(*item_id).await?.is_some() {
                items_granted.push(*item_id);
            } else {
                items_missing.push(*item_id);
            }
        }

        quest.status = QuestStatus::Completed;
        self.quests
            .complete_quest(&quest, &log, &items_granted)
            .await?;

        let result = QuestCompletionResult {
            quest_id,
            character_id,
            experience_awarded: quest.rewards.experience,
            gold_awarded: quest.rewards.gold,
            items_granted,
            items_missing,
        };
        self.audit
            .append(
                "quest.complete",
                Some(&character_id.to_string()),
                Some(&quest_id.to_string()),
                serde_json::to_value(&result).unwrap_or_default(),
            )
            .await?;
        self.publish_background(DomainEvent::QuestCompleted {
            quest_id,
            character_id,
        });
        info!(quest = %quest_id, character = %character_id, "Quest completed");
        Ok(result)
    }

    /// The character's quest log hydrated into full quest objects.
    pub async fn quest_log(&self, character_id: CharacterId) -> Result<QuestLogView, ToolError> {
        let log = self.quests.quest_log(character_id).await?;
        Ok(QuestLogView {
            character_id,
            active: self.hydrate(&log.active_quests).await?,
            completed: self.hydrate(&log.completed_quests).await?,
            failed: self.hydrate(&log.failed_quests).await?,
        })
    }

    async fn hydrate(&self, ids: &[QuestId]) -> Result<Vec<QuestProgressView>, ToolError> {
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(quest) = self.quests.find_by_id(*id).await? {
                views.push(QuestProgressView {
                    quest_id: quest.id,
                    name: quest.name.clone(),
                    objectives: quest
                        .objectives
                        .iter()
                        .map(|o| format!("{}: {}", o.description, o.progress_string()))
                        .collect(),
                });
            }
        }
        Ok(views)
    }
}
