pub mod health;
pub mod battlemap;
pub mod auth_token;
pub mod version;
pub mod diagnostics;

pub use health::*;
pub use battlemap::*;
pub use auth_token::*;
pub use version::*;
pub use diagnostics::*;
