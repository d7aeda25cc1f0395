//! Wire and domain types shared by the marketplace client and form controllers.

pub mod domain;
pub mod error;
pub mod protocol;
