// src/api/mod.rs

pub mod auth;
pub mod health;
pub mod mint;
pub mod tokens;

use std::sync::Arc;

use crate::config::Config;
use crate::platform::PlatformApi;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub platform: Arc<dyn PlatformApi>,
}
