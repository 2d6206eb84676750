//! Typed entities layered over decoded JSON responses.

mod parcel;

pub use parcel::Parcel;
