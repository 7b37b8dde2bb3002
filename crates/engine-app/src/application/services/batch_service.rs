//! Batch operations: bulk creation, item distribution, scripted workflows.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use questwright_domain::entities::Character;
use questwright_domain::{CharacterId, ItemId};
use questwright_engine_ports::inbound::SessionContext;
use questwright_engine_ports::outbound::AuditLogPort;
use questwright_protocol::requests::batch::{
    CreateCharactersRequest, CreateNpcsRequest, DistributeItemsRequest, ExecuteWorkflowRequest,
};
use questwright_protocol::requests::character::CreateCharacterRequest;
use questwright_protocol::requests::combat::{CreateEncounterRequest, ParticipantSpec};

use super::templates::{npc_template, workflow_template, WorkflowTemplate, NPC_TEMPLATES, WORKFLOW_TEMPLATES};
use super::{CharacterService, CombatService, EncounterView};
use crate::application::error::ToolError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResult {
    pub granted: Vec<DistributionLine>,
    pub failed: Vec<DistributionLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionLine {
    pub character_id: CharacterId,
    pub item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub workflow: String,
    pub characters_created: Vec<Character>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<EncounterView>,
}

pub struct BatchService {
    characters: Arc<CharacterService>,
    combat: Arc<CombatService>,
    audit: Arc<dyn AuditLogPort>,
}

impl BatchService {
    pub fn new(
        characters: Arc<CharacterService>,
        combat: Arc<CombatService>,
        audit: Arc<dyn AuditLogPort>,
    ) -> Self {
        Self {
            characters,
            combat,
            audit,
        }
    }

    pub async fn create_characters(
        &self,
        request: CreateCharactersRequest,
    ) -> Result<Vec<Character>, ToolError> {
        request.validate()?;
        let mut created = Vec::with_capacity(request.characters.len());
        for spec in request.characters {
            created.push(self.characters.create(spec).await?);
        }
        self.audit
            .append(
                "batch.create_characters",
                None,
                None,
                json!({"count": created.len()}),
            )
            .await?;
        Ok(created)
    }

    pub async fn create_npcs(
        &self,
        request: CreateNpcsRequest,
    ) -> Result<Vec<Character>, ToolError> {
        request.validate()?;
        let template =
            npc_template(&request.template).ok_or_else(|| ToolError::NotFound {
                entity_type: "NPC template",
                id: request.template.clone(),
            })?;

        let prefix = request
            .name_prefix
            .unwrap_or_else(|| capitalize(template.name));
        let mut created = Vec::with_capacity(request.count as usize);
        for n in 1..=request.count {
            let spec = CreateCharacterRequest {
                name: format!("{prefix} {n}"),
                stats: template.stats,
                max_hp: template.max_hp,
                ac: template.ac,
                level: template.level,
                class_name: None,
                character_type: template.character_type,
                faction_id: None,
                behavior: Some(template.behavior.to_string()),
            };
            created.push(self.characters.create(spec).await?);
        }
        info!(template = template.name, count = created.len(), "NPCs created");
        Ok(created)
    }

    /// Grant every item to every recipient, reporting per-pair results
    /// instead of failing the whole batch.
    pub async fn distribute_items(
        &self,
        request: DistributeItemsRequest,
    ) -> Result<DistributionResult, ToolError> {
        request.validate()?;
        let mut granted = Vec::new();
        let mut failed = Vec::new();
        for &character_id in &request.recipients {
            for &item_id in &request.item_ids {
                match self.characters.give_item(character_id, item_id, 1).await {
                    Ok(()) => granted.push(DistributionLine {
                        character_id,
                        item_id,
                        reason: None,
                    }),
                    Err(err) => failed.push(DistributionLine {
                        character_id,
                        item_id,
                        reason: Some(err.to_string()),
                    }),
                }
            }
        }
        self.audit
            .append(
                "batch.distribute_items",
                None,
                None,
                json!({"granted": granted.len(), "failed": failed.len()}),
            )
            .await?;
        Ok(DistributionResult { granted, failed })
    }

    /// Run a scripted scenario: create its NPCs and, for combat workflows,
    /// open an encounter with them.
    pub async fn execute_workflow(
        &self,
        request: ExecuteWorkflowRequest,
        session: &SessionContext,
    ) -> Result<WorkflowResult, ToolError> {
        let template =
            workflow_template(&request.workflow).ok_or_else(|| ToolError::NotFound {
                entity_type: "Workflow template",
                id: request.workflow.clone(),
            })?;

        let mut characters_created = Vec::new();
        for step in template.steps {
            let batch = self
                .create_npcs(CreateNpcsRequest {
                    template: step.npc_template.to_string(),
                    count: step.count,
                    name_prefix: None,
                })
                .await?;
            characters_created.extend(batch);
        }

        let encounter = if template.creates_encounter {
            let participants = characters_created
                .iter()
                .map(|character| ParticipantSpec {
                    id: Some(character.id.to_string()),
                    name: character.name.clone(),
                    hp: character.hp,
                    max_hp: character.max_hp,
                    ac: character.ac,
                    initiative_bonus: 0,
                    is_enemy: Some(matches!(
                        character.character_type,
                        questwright_domain::entities::CharacterType::Enemy
                    )),
                })
                .collect();
            Some(
                self.combat
                    .create_encounter(
                        CreateEncounterRequest {
                            participants,
                            seed: Some(format!("workflow-{}", template.name)),
                            terrain: None,
                        },
                        session,
                    )
                    .await?,
            )
        } else {
            None
        };

        self.audit
            .append(
                "batch.execute_workflow",
                None,
                None,
                json!({
                    "workflow": template.name,
                    "characters": characters_created.len(),
                    "encounter": encounter.as_ref().map(|view| view.id),
                }),
            )
            .await?;
        Ok(WorkflowResult {
            workflow: template.name.to_string(),
            characters_created,
            encounter,
        })
    }

    pub fn list_templates(&self) -> serde_json::Value {
        json!({
            "npcTemplates": NPC_TEMPLATES.iter().map(|t| t.name).collect::<Vec<_>>(),
            "workflowTemplates": WORKFLOW_TEMPLATES.iter().map(|t| t.name).collect::<Vec<_>>(),
        })
    }

    pub fn get_template(&self, name: &str) -> Result<serde_json::Value, ToolError> {
        if let Some(template) = npc_template(name) {
            return Ok(serde_json::to_value(template).unwrap_or_default());
        }
        if let Some(template) = workflow_template(name) {
            return Ok(serde_json::to_value::<&WorkflowTemplate>(template).unwrap_or_default());
        }
        Err(ToolError::NotFound {
            entity_type: "Template",
            id: name.to_string(),
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
