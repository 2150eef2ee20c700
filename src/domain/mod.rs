mod expense;
mod filter;
mod ledger;
mod money;
mod summary;

pub use expense::*;
pub use filter::*;
pub use ledger::*;
pub use money::*;
pub use summary::*;
