use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::world::{InputFlags, Side, WorldState};

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "init")]
    Init(InitMsg),
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "state")]
    State(WorldState),
    #[serde(rename = "players")]
    Players(PlayersMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "camelCase")]
pub struct InitMsg {
    pub side: Side,
    pub state: WorldState,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
}

fn default_protocol_version() -> u32 {
    PROTOCOL_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
pub struct PlayersMsg {
    /// Occupied seats, left first.
    pub players: Vec<Side>,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "input")]
    Input(InputFlags),
    #[serde(rename = "toggle")]
    Toggle,
    #[serde(rename = "reset")]
    Reset,
}
