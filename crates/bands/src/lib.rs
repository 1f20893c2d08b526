//! Band directory domain module (bands, their members, and users).
//!
//! This crate contains business rules implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage). The `Band` aggregate owns its
//! memberships, so every membership change is persisted together with the band.

pub mod band;
pub mod form;
pub mod member;
pub mod user;

pub use band::{Band, BandEdit, NewBand};
pub use form::{BandEditForm, BandForm, BandMemberForm, MemberEntryForm};
pub use member::{BandMember, MemberDetails};
pub use user::User;
