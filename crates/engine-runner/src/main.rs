//! QuestWright Engine - headless TTRPG simulation for LLM orchestrators
//!
//! This crate is the *composition root* for the engine. It assembles all
//! adapters, wires them to ports, and serves JSON-RPC tool calls over stdio
//! (and optionally a WebSocket listener).

mod composition;
mod run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run::run().await
}
