//! Configuration loaded from files and environment

mod app_config;

pub use app_config::{PublisherKind, ScientistConfig};
