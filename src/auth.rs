//! Auth-domain identifiers, normalized profiles, and token models.

pub mod id;
pub mod profile;
pub mod token;

pub use id::*;
pub use profile::*;
pub use token::{secret::*, set::*};
