//! Identity naming — ledger addresses and the DIDs derived from them.
//!
//! An identity is anchored on a ledger account address. The address never
//! changes; ownership and keys are layered on top by the change log.

pub mod address;
pub mod did;

pub use address::Address;
pub use did::Did;
