//! Client-side synchronization for the pong game.
//!
//! [`sync::ClientSyncAgent`] is what a render loop drives once per frame: it
//! either simulates locally or mirrors an authoritative server.

pub mod autopilot;
pub mod connection;
pub mod sync;
