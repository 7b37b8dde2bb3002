//! Quest lifecycle tools.

use std::sync::Arc;

use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::requests::quest::{
    AssignQuestRequest, CompleteObjectiveRequest, CompleteQuestRequest, CreateQuestRequest,
    GetQuestLogRequest, ListQuestsRequest, QuestRef, UpdateObjectiveRequest,
};
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};
use crate::application::services::QuestService;

pub fn register(registry: &mut ToolRegistry, quests: Arc<QuestService>) -> Result<(), ToolError> {
    let objective_schema = schema::object(
        &[
            ("description", schema::string("What must be done")),
            ("type", schema::string("Objective kind, e.g. kill, fetch, talk")),
            ("target", schema::string("What it counts against")),
            ("required", schema::integer("How many times, default 1")),
        ],
        &["description"],
    );

    let svc = quests.clone();
    registry.register(ToolDefinition::new(
        "create_quest",
        "Create a quest with objectives, rewards and optional prerequisite quests.",
        schema::object(
            &[
                ("worldId", schema::string("Owning world id")),
                ("name", schema::string("Quest name")),
                ("description", schema::string("Narrative description")),
                ("objectives", schema::array("Objectives", objective_schema)),
                ("rewards", schema::any_object("experience, gold, items[]")),
                ("prerequisites", schema::array("Quest ids that must be completed first", schema::string("Quest id"))),
                ("giver", schema::string("Quest giver character id")),
            ],
            &["worldId", "name", "description", "objectives"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: CreateQuestRequest = parse_args(args)?;
                let quest = svc.create(request).await?;
                Ok(ToolResponse::with_state(
                    format!("Quest '{}' created with {} objective(s).", quest.name, quest.objectives.len()),
                    &quest,
                ))
            })
        },
    ))?;

    let svc = quests.clone();
    registry.register(ToolDefinition::new(
        "get_quest",
        "Fetch a quest with its objectives and progress.",
        schema::object(&[("questId", schema::string("Quest id"))], &["questId"]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: QuestRef = parse_args(args)?;
                let quest = svc.get(request.quest_id).await?;
                Ok(ToolResponse::with_state(
                    format!("Quest '{}'.", quest.name),
                    &quest,
                ))
            })
        },
    ))?;

    let svc = quests.clone();
    registry.register(ToolDefinition::new(
        "list_quests",
        "List quests, optionally restricted to one world.",
        schema::object(&[("worldId", schema::string("Optional world filter"))], &[]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: ListQuestsRequest = parse_args(args)?;
                let quests = svc.list(request.world_id).await?;
                Ok(ToolResponse::with_state(
                    format!("{} quest(s).", quests.len()),
                    &quests,
                ))
            })
        },
    ))?;

    let svc = quests.clone();
    registry.register(ToolDefinition::new(
        "assign_quest",
        "Assign a quest to a character; every prerequisite must already be completed by them.",
        schema::object(
            &[
                ("questId", schema::string("Quest id")),
                ("characterId", schema::string("Character id")),
            ],
            &["questId", "characterId"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: AssignQuestRequest = parse_args(args)?;
                svc.assign(request.quest_id, request.character_id).await?;
                Ok(ToolResponse::with_state(
                    "Quest assigned.",
                    &serde_json::json!({
                        "questId": request.quest_id,
                        "characterId": request.character_id,
                        "status": "active",
                    }),
                ))
            })
        },
    ))?;

    let svc = quests.clone();
    registry.register(ToolDefinition::new(
        "update_objective",
        "Add progress to an objective; completion flips automatically at the required count.",
        schema::object(
            &[
                ("questId", schema::string("Quest id")),
                ("objectiveId", schema::string("Objective id")),
                ("progress", schema::integer("Progress delta, default 1")),
            ],
            &["questId", "objectiveId"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: UpdateObjectiveRequest = parse_args(args)?;
                let objective = svc
                    .update_objective(request.quest_id, request.objective_id, request.progress)
                    .await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "Objective '{}' at {}.",
                        objective.description,
                        objective.progress_string()
                    ),
                    &objective,
                ))
            })
        },
    ))?;

    let svc = quests.clone();
    registry.register(ToolDefinition::new(
        "complete_objective",
        "Mark an objective finished regardless of its current count.",
        schema::object(
            &[
                ("questId", schema::string("Quest id")),
                ("objectiveId", schema::string("Objective id")),
            ],
            &["questId", "objectiveId"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: CompleteObjectiveRequest = parse_args(args)?;
                let objective = svc
                    .complete_objective(request.quest_id, request.objective_id)
                    .await?;
                Ok(ToolResponse::with_state(
                    format!("Objective '{}' completed.", objective.description),
                    &objective,
                ))
            })
        },
    ))?;

    let svc = quests.clone();
    registry.register(ToolDefinition::new(
        "complete_quest",
        "Complete a quest once all objectives are done, granting rewards exactly once.",
        schema::object(
            &[
                ("questId", schema::string("Quest id")),
                ("characterId", schema::string("Completing character id")),
            ],
            &["questId", "characterId"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: CompleteQuestRequest = parse_args(args)?;
                let result = svc.complete(request.quest_id, request.character_id).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "Quest completed: {} XP, {} gold, {} item(s).",
                        result.experience_awarded,
                        result.gold_awarded,
                        result.items_granted.len()
                    ),
                    &result,
                ))
            })
        },
    ))?;

    let svc = quests;
    registry.register(ToolDefinition::new(
        "get_quest_log",
        "A character's active, completed and failed quests with per-objective progress.",
        schema::object(&[("characterId", schema::string("Character id"))], &["characterId"]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: GetQuestLogRequest = parse_args(args)?;
                let log = svc.quest_log(request.character_id).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "{} active, {} completed, {} failed.",
                        log.active.len(),
                        log.completed.len(),
                        log.failed.len()
                    ),
                    &log,
                ))
            })
        },
    ))?;

    Ok(())
}
