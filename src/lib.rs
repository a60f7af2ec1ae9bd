pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod onboarding;
pub mod push;
pub mod sync;
pub mod tui;
pub mod types;

pub use api::{ApiClient, BackendCommand, DashboardBackend};
pub use config::Config;
pub use error::SyncError;
pub use onboarding::run_onboarding_checks;
pub use push::PushClient;
pub use sync::{Merger, PushEvent, SyncMessage, ViewModel};
pub use tui::{run_tui, App};
