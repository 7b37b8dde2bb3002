//! Application services, one per domain area.
//!
//! Services orchestrate domain logic over the ports; they never construct
//! wire envelopes. Tool handlers do that from the typed results returned
//! here.

mod batch_service;
mod character_service;
mod combat_service;
mod improvisation_service;
mod quest_service;
mod rest_service;
mod templates;
mod theft_service;
mod world_service;

pub use batch_service::{BatchService, DistributionLine, DistributionResult, WorkflowResult};
pub use character_service::{CharacterService, InventoryLine, InventoryView};
pub use combat_service::{
    AttackResult, CombatService, EncounterView, EndEncounterResult, HealResult, TurnAdvanceResult,
};
pub use improvisation_service::{
    DurationAdvanceResult, ImprovisationService, StuntOutcome, StuntResult, SynthesisOutcome,
    SynthesisResult, TargetOutcome,
};
pub use quest_service::{QuestCompletionResult, QuestLogView, QuestProgressView, QuestService};
pub use rest_service::{LongRestResult, RestService, ShortRestResult};
pub use templates::{
    npc_template, workflow_template, NpcTemplate, WorkflowStep, WorkflowTemplate, NPC_TEMPLATES,
    WORKFLOW_TEMPLATES,
};
pub use theft_service::{
    RecognitionResult, SaleResult, SearchResult, TheftConfig, TheftService,
};
pub use world_service::{MapPatchPreview, WorldService, WorldView};
