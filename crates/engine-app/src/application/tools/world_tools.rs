//! World lifecycle and map tools.

use std::sync::Arc;

use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::requests::world::{
    GenerateWorldRequest, GetRegionMapRequest, GetWorldMapOverviewRequest, GetWorldStateRequest,
    GetWorldTilesRequest, MapPatchRequest,
};
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};
use crate::application::services::WorldService;

pub fn register(registry: &mut ToolRegistry, world: Arc<WorldService>) -> Result<(), ToolError> {
    let svc = world.clone();
    registry.register(ToolDefinition::new(
        "generate_world",
        "Generate a world from a seed; dimensions are bounded to 10..=1000 per side.",
        schema::object(
            &[
                ("name", schema::string("World name")),
                ("seed", schema::integer("Generation seed; same seed, same world")),
                ("width", schema::integer_bounded("Tiles across", 10, 1000)),
                ("height", schema::integer_bounded("Tiles down", 10, 1000)),
            ],
            &["name", "width", "height"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: GenerateWorldRequest = parse_args(args)?;
                let view = svc.generate(request).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "World '{}' generated: {} region(s), {} structure(s).",
                        view.world.name,
                        view.regions.len(),
                        view.structure_count
                    ),
                    &view,
                ))
            })
        },
    ))?;

    let svc = world.clone();
    registry.register(ToolDefinition::new(
        "get_world_state",
        "The world record with its regions and feature counts.",
        schema::object(&[("worldId", schema::string("World id"))], &["worldId"]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: GetWorldStateRequest = parse_args(args)?;
                let view = svc.state(request.world_id).await?;
                Ok(ToolResponse::with_state(
                    format!("World '{}'.", view.world.name),
                    &view,
                ))
            })
        },
    ))?;

    let svc = world.clone();
    registry.register(ToolDefinition::new(
        "list_worlds",
        "List every generated world.",
        schema::object(&[], &[]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let _: serde_json::Value = args;
                let worlds = svc.list().await?;
                Ok(ToolResponse::with_state(
                    format!("{} world(s).", worlds.len()),
                    &worlds,
                ))
            })
        },
    ))?;

    let svc = world.clone();
    registry.register(ToolDefinition::new(
        "delete_world",
        "Delete a world; its regions, tiles, structures, rivers and quests go with it.",
        schema::object(&[("worldId", schema::string("World id"))], &["worldId"]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: GetWorldStateRequest = parse_args(args)?;
                svc.delete(request.world_id).await?;
                Ok(ToolResponse::with_state(
                    "World deleted.",
                    &serde_json::json!({"worldId": request.world_id, "deleted": true}),
                ))
            })
        },
    ))?;

    let patch_ops_schema = schema::array(
        "Patch operations",
        schema::object(
            &[
                ("op", schema::string_enum("Operation", &["set_tile", "place_structure", "remove_structure"])),
                ("x", schema::integer("Tile x")),
                ("y", schema::integer("Tile y")),
                ("terrain", schema::string("New terrain (set_tile)")),
                ("kind", schema::string("Structure kind (place_structure)")),
                ("name", schema::string("Structure name (place_structure)")),
            ],
            &["op", "x", "y"],
        ),
    );

    let svc = world.clone();
    registry.register(ToolDefinition::new(
        "preview_map_patch",
        "Dry-run a map patch: reports what would change and which ops are invalid.",
        schema::object(
            &[
                ("worldId", schema::string("World id")),
                ("ops", patch_ops_schema.clone()),
            ],
            &["worldId", "ops"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: MapPatchRequest = parse_args(args)?;
                let preview = svc.preview_patch(&request).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "{} tile(s), +{} structure(s), -{} structure(s); {} op(s) rejected.",
                        preview.tiles_changed,
                        preview.structures_placed,
                        preview.structures_removed,
                        preview.rejected.len()
                    ),
                    &preview,
                ))
            })
        },
    ))?;

    let svc = world.clone();
    registry.register(ToolDefinition::new(
        "apply_map_patch",
        "Apply a map patch; all ops must be valid, and the tile cache is invalidated.",
        schema::object(
            &[
                ("worldId", schema::string("World id")),
                ("ops", patch_ops_schema),
            ],
            &["worldId", "ops"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: MapPatchRequest = parse_args(args)?;
                let applied = svc.apply_patch(request).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "Patch applied: {} tile(s), +{}/-{} structure(s).",
                        applied.tiles_changed, applied.structures_placed, applied.structures_removed
                    ),
                    &applied,
                ))
            })
        },
    ))?;

    let svc = world.clone();
    registry.register(ToolDefinition::new(
        "get_world_map_overview",
        "Terrain histogram, regions and structure count for the whole map.",
        schema::object(&[("worldId", schema::string("World id"))], &["worldId"]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: GetWorldMapOverviewRequest = parse_args(args)?;
                let overview = svc.map_overview(request.world_id).await?;
                Ok(ToolResponse::with_state("Map overview.", &overview))
            })
        },
    ))?;

    let svc = world.clone();
    registry.register(ToolDefinition::new(
        "get_region_map",
        "Tiles within one region's bounds.",
        schema::object(
            &[
                ("worldId", schema::string("World id")),
                ("regionId", schema::string("Region id")),
            ],
            &["worldId", "regionId"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: GetRegionMapRequest = parse_args(args)?;
                let map = svc.region_map(request.world_id, request.region_id).await?;
                Ok(ToolResponse::with_state("Region map.", &map))
            })
        },
    ))?;

    let svc = world;
    registry.register(ToolDefinition::new(
        "get_world_tiles",
        "A viewport of raw tiles; omit width/height for the whole grid.",
        schema::object(
            &[
                ("worldId", schema::string("World id")),
                ("x", schema::integer("Viewport origin x, default 0")),
                ("y", schema::integer("Viewport origin y, default 0")),
                ("width", schema::integer("Viewport width")),
                ("height", schema::integer("Viewport height")),
            ],
            &["worldId"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: GetWorldTilesRequest = parse_args(args)?;
                let tiles = svc
                    .tiles(
                        request.world_id,
                        request.x,
                        request.y,
                        request.width,
                        request.height,
                    )
                    .await?;
                Ok(ToolResponse::with_state(
                    format!("{} tile(s).", tiles.len()),
                    &tiles,
                ))
            })
        },
    ))?;

    Ok(())
}
