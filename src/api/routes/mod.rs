//! Route handlers for the REST API
//!
//! - [`batch`] - run a fetch batch
//! - [`system`] - health and OpenAPI
//! - [`ui`] - browser form

mod batch;
mod system;
mod ui;

pub use batch::*;
pub use system::*;
pub use ui::*;
