pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod openai;
pub mod prompt;
pub mod reminder;
pub mod shutdown;
pub mod startup;
pub mod utils;

use std::sync::Arc;

use crate::reminder::ReminderGenerator;

#[derive(Clone)]
pub struct AppState {
    /// Reminder generator shared by all requests
    pub generator: Arc<ReminderGenerator>,
}
