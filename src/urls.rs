//! Fragment routing module.
//!
//! This module provides fragment route patterns, the route table and the
//! activity path types shared by the router.
//!
//! # Examples
//!
//! ```
//! use reinhardt_navigation::urls::RoutePattern;
//!
//! let pattern = RoutePattern::new("/users/:id").unwrap();
//! assert_eq!(pattern.param_names(), &["id"]);
//! ```

pub use reinhardt_activity_urls::*;
