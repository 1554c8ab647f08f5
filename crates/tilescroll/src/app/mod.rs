mod input;
mod loop_runner;
mod metrics;
mod pacing;
mod session;

pub use input::{InputAction, InputSnapshot, SLOT_KEY_COUNT};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use pacing::SLOW_FRAME_ENV_VAR;
pub use session::{prepare_frame, Session, SessionCommand};
