//! Grouping domain models.
//!
//! Provides the value types for one round of group assignments.
//! Every transformation in the crate returns new values; nothing here is
//! mutated in place once handed to a pipeline stage.
//!
//! # Domain Mappings
//!
//! | u-grouping | Coffee rota | Study circles | Code review |
//! |------------|-------------|---------------|-------------|
//! | Grouping | Coffee group | Circle | Review pod |
//! | Permutation | Round | Term | Sprint rotation |
//! | leader | Organiser | Facilitator | Lead reviewer |

mod grouping;
mod permutation;

pub use grouping::Grouping;
pub use permutation::Permutation;

/// Opaque participant identity (an email-shaped string).
pub type ParticipantId = String;
