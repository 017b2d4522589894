pub mod battlemap;
pub mod health;
pub mod diagnostics;
pub mod version;
pub mod error;

pub use battlemap::*;
pub use health::*;
pub use diagnostics::*;
pub use version::*;
pub use error::*;
