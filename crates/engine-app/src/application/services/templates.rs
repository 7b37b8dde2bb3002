//! NPC and workflow templates for the batch tool.

use serde::Serialize;

use questwright_domain::entities::CharacterType;
use questwright_domain::value_objects::StatBlock;

/// A named NPC archetype with a baked-in stat block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub stats: StatBlock,
    pub max_hp: i32,
    pub ac: i32,
    pub level: u8,
    pub character_type: CharacterType,
    pub behavior: &'static str,
}

pub const NPC_TEMPLATES: [NpcTemplate; 4] = [
    NpcTemplate {
        name: "guard",
        description: "Town watch regular with a halberd and a schedule",
        stats: StatBlock {
            str: 13,
            dex: 12,
            con: 12,
            int: 10,
            wis: 11,
            cha: 10,
        },
        max_hp: 11,
        ac: 16,
        level: 2,
        character_type: CharacterType::Npc,
        behavior: "patrols and reports crimes",
    },
    NpcTemplate {
        name: "villager",
        description: "Ordinary commoner going about their day",
        stats: StatBlock {
            str: 10,
            dex: 10,
            con: 10,
            int: 10,
            wis: 10,
            cha: 10,
        },
        max_hp: 4,
        ac: 10,
        level: 1,
        character_type: CharacterType::Npc,
        behavior: "avoids trouble",
    },
    NpcTemplate {
        name: "merchant",
        description: "Shopkeeper with an eye for margins",
        stats: StatBlock {
            str: 9,
            dex: 11,
            con: 10,
            int: 13,
            wis: 12,
            cha: 14,
        },
        max_hp: 6,
        ac: 11,
        level: 1,
        character_type: CharacterType::Npc,
        behavior: "haggles and gossips",
    },
    NpcTemplate {
        name: "bandit",
        description: "Roadside tough with a scimitar",
        stats: StatBlock {
            str: 11,
            dex: 12,
            con: 12,
            int: 10,
            wis: 10,
            cha: 10,
        },
        max_hp: 11,
        ac: 12,
        level: 1,
        character_type: CharacterType::Enemy,
        behavior: "threatens travellers",
    },
];

pub fn npc_template(name: &str) -> Option<&'static NpcTemplate> {
    NPC_TEMPLATES
        .iter()
        .find(|template| template.name == name.trim().to_lowercase())
}

/// One step of a scripted workflow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub npc_template: &'static str,
    pub count: u32,
}

/// A scripted scenario: NPCs to create and whether they square off in an
/// encounter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub steps: &'static [WorkflowStep],
    pub creates_encounter: bool,
}

pub const WORKFLOW_TEMPLATES: [WorkflowTemplate; 3] = [
    WorkflowTemplate {
        name: "tavern_brawl",
        description: "Patrons and toughs come to blows",
        steps: &[
            WorkflowStep {
                npc_template: "villager",
                count: 3,
            },
            WorkflowStep {
                npc_template: "bandit",
                count: 2,
            },
        ],
        creates_encounter: true,
    },
    WorkflowTemplate {
        name: "goblin_ambush",
        description: "Bandits spring from the treeline",
        steps: &[WorkflowStep {
            npc_template: "bandit",
            count: 4,
        }],
        creates_encounter: true,
    },
    WorkflowTemplate {
        name: "market_day",
        description: "Stalls, sellers and a watchful guard",
        steps: &[
            WorkflowStep {
                npc_template: "merchant",
                count: 3,
            },
            WorkflowStep {
                npc_template: "villager",
                count: 4,
            },
            WorkflowStep {
                npc_template: "guard",
                count: 1,
            },
        ],
        creates_encounter: false,
    },
];

pub fn workflow_template(name: &str) -> Option<&'static WorkflowTemplate> {
    WORKFLOW_TEMPLATES
        .iter()
        .find(|template| template.name == name.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lookup_is_case_insensitive() {
        assert!(npc_template("Guard").is_some());
        assert!(npc_template("dragon").is_none());
        assert!(workflow_template("TAVERN_BRAWL").is_some());
    }

    #[test]
    fn test_workflow_steps_reference_real_templates() {
        for workflow in &WORKFLOW_TEMPLATES {
            for step in workflow.steps {
                assert!(
                    npc_template(step.npc_template).is_some(),
                    "{} references unknown template {}",
                    workflow.name,
                    step.npc_template
                );
            }
        }
    }
}
