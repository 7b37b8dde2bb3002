//! Batch requests: bulk creation, item distribution, workflow templates.

use serde::{Deserialize, Serialize};

use questwright_domain::{CharacterId, DomainError, ItemId};

use super::character::CreateCharacterRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharactersRequest {
    pub characters: Vec<CreateCharacterRequest>,
}

impl CreateCharactersRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.characters.is_empty() {
            return Err(DomainError::validation("characters cannot be empty"));
        }
        for character in &self.characters {
            character.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNpcsRequest {
    /// Template name from the catalogue (guard, villager, merchant, bandit)
    pub template: String,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
}

impl CreateNpcsRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.count == 0 || self.count > 50 {
            return Err(DomainError::validation("count must be within 1..=50"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeItemsRequest {
    pub item_ids: Vec<ItemId>,
    pub recipients: Vec<CharacterId>,
}

impl DistributeItemsRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.item_ids.is_empty() || self.recipients.is_empty() {
            return Err(DomainError::validation(
                "itemIds and recipients must both be non-empty",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteWorkflowRequest {
    /// Workflow template name (tavern_brawl, goblin_ambush, market_day)
    pub workflow: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTemplateRequest {
    pub name: String,
}

/// The consolidated batch tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BatchManageRequest {
    CreateCharacters(CreateCharactersRequest),
    CreateNpcs(CreateNpcsRequest),
    DistributeItems(DistributeItemsRequest),
    ExecuteWorkflow(ExecuteWorkflowRequest),
    ListTemplates {},
    GetTemplate(GetTemplateRequest),
}

impl BatchManageRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::CreateCharacters(request) => request.validate(),
            Self::CreateNpcs(request) => request.validate(),
            Self::DistributeItems(request) => request.validate(),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_npcs_bounds() {
        let request: BatchManageRequest = serde_json::from_value(json!({
            "action": "create_npcs",
            "template": "guard",
            "count": 3
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let request: BatchManageRequest = serde_json::from_value(json!({
            "action": "create_npcs",
            "template": "guard",
            "count": 0
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_nested_character_validation() {
        let request: BatchManageRequest = serde_json::from_value(json!({
            "action": "create_characters",
            "characters": [{"name": "", "maxHp": 8}]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
