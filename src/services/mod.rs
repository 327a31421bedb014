//! Service implementations: persistence, external providers, scheduling

pub mod agent;
pub mod progress;
pub mod query_gen;
pub mod scheduler;
pub mod store;

pub use agent::GroqSearchProvider;
pub use progress::ProgressTracker;
pub use query_gen::LlmQueryGenerator;
pub use scheduler::SchedulerHandle;
pub use store::VenueStore;
