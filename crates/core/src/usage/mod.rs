//! Usage recording for rendered templates.
//!
//! Every non-fatal render is handed to a [`UsageRecorder`]. The file-backed
//! recorder appends one JSON object per line to the configured usage log
//! (`.replykit/usage.jsonl` under the templates directory by default).

mod service;
mod types;

pub use service::{MemoryUsageRecorder, UsageError, UsageLogService, UsageRecorder};
pub use types::UsageRecord;
