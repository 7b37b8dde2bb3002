//! Pool construction and schema migration.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use questwright_engine_ports::outbound::RepositoryError;

use crate::infrastructure::config::AppConfig;

/// Connect and migrate. In-memory databases get a single-connection pool so
/// every handle sees the same store.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, RepositoryError> {
    let url = config.database_url();
    let options = SqliteConnectOptions::from_str(&url)
        .map_err(|err| RepositoryError::storage(err.to_string()))?
        .foreign_keys(true)
        .create_if_missing(true);

    let max_connections = if config.data_dir.is_none() { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|err| RepositoryError::storage(err.to_string()))?;

    run_migrations(&pool).await?;
    tracing::info!(url = %url, "Database ready");
    Ok(pool)
}

/// Idempotent schema creation. The `tile_cache` column is part of the
/// initial schema, not a runtime migration.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    const TABLES: &[&str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS worlds (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            seed INTEGER NOT NULL,
            width INTEGER NOT NULL,
            height INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            tile_cache BLOB
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS regions (
            id TEXT PRIMARY KEY,
            world_id TEXT NOT NULL REFERENCES worlds(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            biome TEXT NOT NULL,
            x INTEGER NOT NULL,
            y INTEGER NOT NULL,
            width INTEGER NOT NULL,
            height INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS tiles (
            world_id TEXT NOT NULL REFERENCES worlds(id) ON DELETE CASCADE,
            x INTEGER NOT NULL,
            y INTEGER NOT NULL,
            terrain TEXT NOT NULL,
            elevation REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (world_id, x, y)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS structures (
            id TEXT PRIMARY KEY,
            world_id TEXT NOT NULL REFERENCES worlds(id) ON DELETE CASCADE,
            x INTEGER NOT NULL,
            y INTEGER NOT NULL,
            kind TEXT NOT NULL,
            name TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS rivers (
            id TEXT PRIMARY KEY,
            world_id TEXT NOT NULL REFERENCES worlds(id) ON DELETE CASCADE,
            path TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS patches (
            id TEXT PRIMARY KEY,
            world_id TEXT NOT NULL REFERENCES worlds(id) ON DELETE CASCADE,
            ops TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS characters (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            stats TEXT NOT NULL,
            hp INTEGER NOT NULL,
            max_hp INTEGER NOT NULL,
            ac INTEGER NOT NULL,
            level INTEGER NOT NULL,
            class_name TEXT,
            faction_id TEXT,
            behavior TEXT,
            character_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            item_type TEXT NOT NULL,
            weight REAL NOT NULL DEFAULT 0,
            value INTEGER NOT NULL DEFAULT 0,
            properties TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS inventory_items (
            character_id TEXT NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
            item_id TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
            quantity INTEGER NOT NULL,
            equipped INTEGER NOT NULL DEFAULT 0,
            slot TEXT,
            PRIMARY KEY (character_id, item_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS encounters (
            id TEXT PRIMARY KEY,
            tokens TEXT NOT NULL,
            round INTEGER NOT NULL,
            current_turn_index INTEGER NOT NULL,
            status TEXT NOT NULL,
            seed TEXT NOT NULL,
            terrain TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS quests (
            id TEXT PRIMARY KEY,
            world_id TEXT NOT NULL REFERENCES worlds(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL,
            objectives TEXT NOT NULL,
            rewards TEXT NOT NULL,
            prerequisites TEXT NOT NULL,
            giver TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS quest_logs (
            character_id TEXT PRIMARY KEY REFERENCES characters(id) ON DELETE CASCADE,
            active_quests TEXT NOT NULL,
            completed_quests TEXT NOT NULL,
            failed_quests TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS theft_records (
            item_id TEXT PRIMARY KEY,
            stolen_from TEXT NOT NULL,
            stolen_by TEXT NOT NULL,
            stolen_location TEXT,
            witnesses TEXT NOT NULL,
            heat_level TEXT NOT NULL,
            reported_to_guards INTEGER NOT NULL DEFAULT 0,
            bounty INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS fences (
            npc_id TEXT PRIMARY KEY,
            faction_id TEXT,
            buy_rate REAL NOT NULL,
            max_heat_level TEXT NOT NULL,
            daily_heat_capacity INTEGER NOT NULL,
            daily_heat_used INTEGER NOT NULL DEFAULT 0,
            specializations TEXT NOT NULL,
            cooldown_days INTEGER NOT NULL DEFAULT 0
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS custom_effects (
            id TEXT PRIMARY KEY,
            target_id TEXT NOT NULL,
            target_type TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            power_level INTEGER NOT NULL,
            mechanics TEXT NOT NULL,
            duration TEXT NOT NULL,
            triggers TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            source TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS synthesized_spells (
            id TEXT PRIMARY KEY,
            character_id TEXT NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            school TEXT NOT NULL,
            level INTEGER NOT NULL,
            effect_type TEXT NOT NULL,
            effect_dice TEXT,
            mastered_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS audit_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action TEXT NOT NULL,
            actor_id TEXT,
            target_id TEXT,
            details TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS event_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_type TEXT NOT NULL,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ];

    for ddl in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;
    }

    const INDEXES: &[&str] = &[
        "CREATE INDEX IF NOT EXISTS idx_effects_target ON custom_effects(target_id, is_active)",
        "CREATE INDEX IF NOT EXISTS idx_inventory_item ON inventory_items(item_id)",
        "CREATE INDEX IF NOT EXISTS idx_theft_victim ON theft_records(stolen_from)",
        "CREATE INDEX IF NOT EXISTS idx_quests_world ON quests(world_id)",
        "CREATE INDEX IF NOT EXISTS idx_spells_character ON synthesized_spells(character_id)",
    ];
    for ddl in INDEXES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|err| RepositoryError::storage(err.to_string()))?;
    }
    Ok(())
}
