//! Tool handler registry and the built-in tool implementations.
//!
//! Tools fall in two groups: public (`ping`) and private (everything else).
//! The split is not configured anywhere — each private handler calls
//! [`require_identity`](crate::auth::require_identity) itself, which is what
//! lets one server process host both kinds without per-route policy.

mod registry;

pub use registry::{ToolContext, ToolHandler, ToolRegistry};

// Tool handler implementations
mod example_data;
mod ping;
mod profile;

pub use example_data::{CreateExampleDataHandler, ListExampleDataHandler, UpdateExampleDataHandler};
pub use ping::PingHandler;
pub use profile::GetUserProfileHandler;
