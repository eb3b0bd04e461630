//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` derives the endpoint set for a provider from its configured domain.
//! `strategy` defines [`ProviderStrategy`], the capability interface flows drive to fetch
//! profiles, split token responses, and classify token errors. `gitea` ships the Gitea
//! adapter.

pub mod descriptor;
pub mod gitea;
pub mod strategy;

pub use descriptor::*;
pub use gitea::*;
pub use strategy::*;
