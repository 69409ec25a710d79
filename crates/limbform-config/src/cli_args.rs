use std::path::PathBuf;

/// CLI-provided overrides, highest precedence in discovery
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file path (skips discovery)
    pub config_path: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub description_model: Option<String>,
    pub sender_email: Option<String>,
    pub recipient_email: Option<String>,
    pub timeout_secs: Option<u64>,
}
