//! Types and simulation shared by the pong server and clients.

pub mod config;
pub mod physics;
pub mod protocol;
pub mod world;
