use crate::session::CommandSender;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the dispatcher that owns the mounted area
    pub commands: CommandSender,
}

impl AppState {
    pub fn new(commands: CommandSender) -> Self {
        Self { commands }
    }
}
