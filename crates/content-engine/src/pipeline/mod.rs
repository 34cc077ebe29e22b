pub mod context;
pub mod error;
pub mod progress;
pub mod runner;

pub use context::PipelineContext;
pub use error::{PipelineError, PipelineWarning};
pub use progress::{
    BroadcastProgress, LogProgress, NoopProgress, ProgressEvent, ProgressReporter,
    RecordingProgress, StageStatus,
};
pub use runner::{ContentEngine, GenerationResult};
