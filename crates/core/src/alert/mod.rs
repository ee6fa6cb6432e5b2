mod error;
mod record;
mod state;

pub use error::AlertError;
pub use record::{AlertNotification, AlertRecord, CreateRequest, Metadata, ModifyRequest};
pub use state::{AlertPhase, AlertState};
