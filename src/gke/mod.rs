/// GKE API client and provisioning engine
pub mod client;
pub mod engine;
pub mod models;

pub use client::GkeClient;
pub use engine::{ContainerEngine, GkeEngine};
