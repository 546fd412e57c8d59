pub mod commands;
pub mod error;
pub mod model;
pub mod session;
pub mod transaction;


// Re-export key types for easier usage
pub use commands::*;
pub use error::ModelError;
pub use model::*;
pub use session::Session;
pub use transaction::*;
