//! Plain data types shared by every qcsim crate.
//!
//! Nothing in here computes anything beyond trivial accessors; the engine,
//! metric primitives and scanner live in `qcsim_core`.

pub mod data;

pub use data::{clamp01, clamp_unit_range};

pub use data::civilization::{CivilizationSnapshot, CivilizationType, ResonanceDomain};
pub use data::crisis::{
    AmplificationComponents, CollapseComponents, MediaCoverage, ResilienceComponents,
};
pub use data::entity::{Entity, EntityData, HistoryEntry, Scalar};
