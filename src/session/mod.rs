//! Live edit sessions: one editor fanned out to any number of viewers per document.

pub mod registry;
#[allow(clippy::module_inception)]
pub mod session;

pub use registry::*;
pub use session::*;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("document is already being edited")]
    AlreadyExists,
    #[error("no edit session for this document")]
    NotExists,
    #[error("viewer is not registered with this session")]
    ViewerNotFound,
}
