//! dueping-core: due-date normalization, bucketing and digest rendering

pub mod classify;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod task;
pub mod time;

pub use classify::{Bucket, BucketPolicy, Classification, ClassifiedTask, Window, classify};
pub use error::{DueError, DueResult};
pub use pipeline::{NotificationSink, RunReport, TaskSource, prepare, run_once};
pub use render::{
    Digest, DisplayEntry, EmbedSection, RenderOptions, TimestampStyle, render_digest, render_task,
    role_mention, timestamp_token,
};
pub use task::Task;
pub use time::{NormalizedDue, add_days, normalize};
