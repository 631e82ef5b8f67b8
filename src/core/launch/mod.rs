pub mod session;
pub mod task;

pub use session::{apply_account, patch_options, SESSION_KEYS};
pub use task::{client_exe_name, LaunchOrchestrator, LaunchOutcome, LaunchPhase};
