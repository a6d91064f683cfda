//! Fragment routing primitives for Reinhardt activity navigation.
//!
//! This crate provides the URL side of the activity router:
//!
//! - [`RoutePattern`]: compiled `:param` / `*splat` / `(optional)` patterns
//! - [`RouteTable`]: ordered routes where the last registration wins
//! - [`ActivityPath`]: the `A::B::C` activity path form
//! - [`Arguments`]: positional arguments extracted from a fragment
//!
//! The lifecycle engine that consumes these types lives in
//! `reinhardt-activities`.

pub mod error;
pub mod path;
pub mod pattern;
pub mod table;

pub use error::{UrlError, UrlResult};
pub use path::{ActivityPath, Arguments, PATH_SEPARATOR};
pub use pattern::{RoutePattern, normalize_fragment};
pub use table::{DuplicatePolicy, Route, RouteMatch, RouteTable};
