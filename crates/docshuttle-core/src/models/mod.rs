pub mod event;
pub mod file;
pub mod job;

pub use event::LifecycleEvent;
pub use file::FileRecord;
pub use job::ConversionJob;
