pub mod ledger;
pub mod snapshot;
