#[macro_use]
extern crate serde;

mod authn;
mod error;
mod ledger;
mod mock;
mod relay;
mod serde_num;
mod shuffle;
mod sqlite;
mod store;
mod view;
mod vote;

pub use authn::*;
pub use error::*;
pub use ledger::*;
pub use mock::*;
pub use relay::*;
pub use serde_num::*;
pub use shuffle::*;
pub use sqlite::*;
pub use store::*;
pub use view::*;
pub use vote::*;

#[cfg(test)]
mod tests;
