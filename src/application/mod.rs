// Application layer - validation and orchestration on top of the storage
// and the pure calculations in `domain`.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
