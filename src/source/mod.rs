pub mod classify;
pub mod discovery;
pub mod scheduler;

pub use classify::SourceType;
pub use discovery::discover_sources;
pub use scheduler::PriorityScheduler;
