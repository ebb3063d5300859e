//! atlas-types - Sample internal types
//!
//! [`def`] holds the operator-side view of an Atlas resource. Its conversions
//! to and from `atlas_sdk` and the forwarding wrapper live in
//! `src/generated.rs`, produced by `schemabridge generate --source src/def.rs`.

pub mod def;
