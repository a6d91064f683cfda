//! Activity lifecycle module.
//!
//! This module provides the activity tree, the transition engine and the
//! [`ActivityRouter`](reinhardt_activities::ActivityRouter) that drives them.

pub use reinhardt_activities::*;
