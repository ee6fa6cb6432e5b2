mod http;
mod in_memory;
mod outcome;
mod traits;

pub use http::HttpTransport;
pub use in_memory::{DisablePolicy, InMemoryAuthority, InMemoryAuthorityBuilder};
pub use outcome::{RequestFailure, TransportOutcome};
pub use traits::AlertTransport;
