//! Debug sessions: recorded steps, the forward-only session state machine
//! and the process-wide session table.

pub mod manager;
pub mod session;
pub mod step;
pub mod store;

pub use manager::{source_type_of, DebugSessionManager};
pub use session::{DebugSession, SessionState};
pub use step::{SourceType, Step};
pub use store::SessionStore;
