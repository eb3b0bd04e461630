//! Token secrets and token-endpoint response models.

pub mod secret;
pub mod set;
