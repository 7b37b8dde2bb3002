//! The consolidated batch tool.

use std::sync::Arc;

use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::requests::batch::BatchManageRequest;
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};
use crate::application::router::{ActionRouter, ActionSpec};
use crate::application::services::BatchService;

fn router() -> ActionRouter {
    ActionRouter::new(
        "batch_manage",
        vec![
            ActionSpec::new("create_characters", &["bulk_create", "characters"], "Create several characters"),
            ActionSpec::new("create_npcs", &["npcs", "spawn_npcs"], "Create NPCs from a template"),
            ActionSpec::new("distribute_items", &["give_items", "distribute"], "Hand items to several characters"),
            ActionSpec::new("execute_workflow", &["workflow", "run_workflow"], "Run a scripted scenario"),
            ActionSpec::new("list_templates", &["templates"], "List NPC and workflow templates"),
            ActionSpec::new("get_template", &["template"], "Inspect one template"),
        ],
    )
}

pub fn register(registry: &mut ToolRegistry, batch: Arc<BatchService>) -> Result<(), ToolError> {
    let action_router = Arc::new(router());
    let actions = action_router.action_names();

    registry.register(ToolDefinition::new(
        "batch_manage",
        "Bulk operations: create_characters, create_npcs, distribute_items, execute_workflow, list_templates, get_template.",
        schema::object(
            &[
                ("action", schema::string_enum("Operation to perform", &actions)),
                ("characters", schema::array("Character specs (create_characters)", schema::any_object("create_character payload"))),
                ("template", schema::string("NPC template name (create_npcs)")),
                ("count", schema::integer_bounded("How many to create", 1, 50)),
                ("namePrefix", schema::string("Name prefix for generated NPCs")),
                ("itemIds", schema::array("Item ids to hand out", schema::string("Item id"))),
                ("recipients", schema::array("Recipient character ids", schema::string("Character id"))),
                ("workflow", schema::string("Workflow template name (execute_workflow)")),
                ("name", schema::string("Template name (get_template)")),
            ],
            &["action"],
        ),
        move |args, session| {
            let action_router = action_router.clone();
            let svc = batch.clone();
            Box::pin(async move {
                let normalized = action_router.normalize(args)?;
                let request: BatchManageRequest = parse_args(normalized)?;
                request.validate()?;
                match request {
                    BatchManageRequest::CreateCharacters(create) => {
                        let characters = svc.create_characters(create).await?;
                        Ok(ToolResponse::with_state(
                            format!("{} character(s) created.", characters.len()),
                            &characters,
                        ))
                    }
                    BatchManageRequest::CreateNpcs(create) => {
                        let npcs = svc.create_npcs(create).await?;
                        Ok(ToolResponse::with_state(
                            format!("{} NPC(s) created.", npcs.len()),
                            &npcs,
                        ))
                    }
                    BatchManageRequest::DistributeItems(distribute) => {
                        let result = svc.distribute_items(distribute).await?;
                        Ok(ToolResponse::with_state(
                            format!(
                                "{} grant(s) succeeded, {} failed.",
                                result.granted.len(),
                                result.failed.len()
                            ),
                            &result,
                        ))
                    }
                    BatchManageRequest::ExecuteWorkflow(execute) => {
                        let result = svc.execute_workflow(execute, &session).await?;
                        let narrative = match &result.encounter {
                            Some(encounter) => format!(
                                "Workflow '{}' ran: {} character(s), encounter {} opened.",
                                result.workflow,
                                result.characters_created.len(),
                                encounter.id
                            ),
                            None => format!(
                                "Workflow '{}' ran: {} character(s) created.",
                                result.workflow,
                                result.characters_created.len()
                            ),
                        };
                        Ok(ToolResponse::with_state(narrative, &result))
                    }
                    BatchManageRequest::ListTemplates {} => {
                        let templates = svc.list_templates();
                        Ok(ToolResponse::with_state("Template catalogue.", &templates))
                    }
                    BatchManageRequest::GetTemplate(get) => {
                        let template = svc.get_template(&get.name)?;
                        Ok(ToolResponse::with_state(
                            format!("Template '{}'.", get.name),
                            &template,
                        ))
                    }
                }
            })
        },
    ))?;
    Ok(())
}
