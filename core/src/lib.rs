pub mod blender;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod features;
pub mod monitoring;
pub mod profile;
pub mod recommender;
pub mod regressor;
pub mod ridge;
pub mod rng;
pub mod rule_scorer;
pub mod scaler;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod types;
