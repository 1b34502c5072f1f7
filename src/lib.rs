#[cfg(test)]
#[macro_use] extern crate hex_literal;

mod stats;
mod util;
mod crypto;

pub use stats::*;
pub use util::*;
pub use crypto::*;
