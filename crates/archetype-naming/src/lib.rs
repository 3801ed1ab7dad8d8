// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Turns fitted clusters into named archetypes.
//!
//! A cluster is named by running its medoid's traits through the ordered
//! [`RuleBook`]; each member is then re-evaluated on its own traits for a
//! sub-archetype and a hybrid flag. Profiles are rebuilt from scratch on
//! every call.

pub mod palette;
pub mod profile;
pub mod role;
pub mod rules;
pub mod traits;

pub use palette::Palette;
pub use profile::{
    ArchetypeNamer, ArchetypeProfile, ClusterName, MemberLabel, NamingOutcome, profile_key,
};
pub use role::RoleClass;
pub use rules::{
    ArchetypeRule, HYBRID_MARKER, KITCHEN_SINK, PURE, RuleBook, display_label,
};
pub use traits::TraitRecord;
