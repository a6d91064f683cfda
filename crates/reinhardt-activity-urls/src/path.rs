//! Activity paths and positional navigation arguments.
//!
//! An activity path names a chain of nested activities from the root to the
//! displayed leaf. Its string form joins the names with `::`:
//!
//! ```
//! use reinhardt_activity_urls::ActivityPath;
//!
//! let path = ActivityPath::parse("Users::Detail").unwrap();
//! assert_eq!(path.len(), 2);
//! assert_eq!(path.leaf(), Some("Detail"));
//! assert_eq!(path.to_string(), "Users::Detail");
//! ```

use crate::error::{UrlError, UrlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between activity names in the string form of a path.
pub const PATH_SEPARATOR: &str = "::";

/// Ordered list of activity names from root to leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivityPath {
	segments: Vec<String>,
}

impl ActivityPath {
	/// Parses a `::`-delimited activity path string.
	///
	/// # Errors
	///
	/// Returns [`UrlError::InvalidActivityPath`] if the string is empty or
	/// contains an empty segment.
	pub fn parse(path: &str) -> UrlResult<Self> {
		let trimmed = path.trim();
		if trimmed.is_empty() {
			return Err(UrlError::InvalidActivityPath(path.to_string()));
		}

		let segments: Vec<String> = trimmed
			.split(PATH_SEPARATOR)
			.map(|s| s.trim().to_string())
			.collect();

		if segments.iter().any(|s| s.is_empty()) {
			return Err(UrlError::InvalidActivityPath(path.to_string()));
		}

		Ok(Self { segments })
	}

	/// Creates a path from already split activity names.
	///
	/// # Errors
	///
	/// Returns [`UrlError::InvalidActivityPath`] if any name is empty or
	/// itself contains the `::` separator.
	pub fn from_segments<I, S>(segments: I) -> UrlResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
		if segments
			.iter()
			.any(|s| s.is_empty() || s.contains(PATH_SEPARATOR))
		{
			return Err(UrlError::InvalidActivityPath(segments.join(PATH_SEPARATOR)));
		}
		Ok(Self { segments })
	}

	/// Returns `true` when the string contains the activity path separator.
	pub fn looks_like_path(target: &str) -> bool {
		target.contains(PATH_SEPARATOR)
	}

	/// Returns the activity names in order.
	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	/// Returns the number of activities in the path.
	pub fn len(&self) -> usize {
		self.segments.len()
	}

	/// Returns `true` if the path names no activity.
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Returns the name at `depth`, if any.
	pub fn get(&self, depth: usize) -> Option<&str> {
		self.segments.get(depth).map(String::as_str)
	}

	/// Returns the root activity name.
	pub fn root(&self) -> Option<&str> {
		self.get(0)
	}

	/// Returns the leaf activity name.
	pub fn leaf(&self) -> Option<&str> {
		self.segments.last().map(String::as_str)
	}

	/// Returns the path made of the first `len` names.
	pub fn prefix(&self, len: usize) -> Self {
		Self {
			segments: self.segments[..len.min(self.segments.len())].to_vec(),
		}
	}

	/// Returns the string key of the prefix ending at `depth` (inclusive).
	pub fn key_at(&self, depth: usize) -> String {
		self.segments[..=depth.min(self.segments.len().saturating_sub(1))].join(PATH_SEPARATOR)
	}

	/// Returns a new path with `name` appended.
	pub fn child(&self, name: impl Into<String>) -> Self {
		let mut segments = self.segments.clone();
		segments.push(name.into());
		Self { segments }
	}

	/// Length of the longest shared prefix, comparing names at each depth.
	pub fn common_prefix_len(&self, other: &ActivityPath) -> usize {
		self.segments
			.iter()
			.zip(other.segments.iter())
			.take_while(|(a, b)| a == b)
			.count()
	}
}

impl fmt::Display for ActivityPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.segments.join(PATH_SEPARATOR))
	}
}

impl FromStr for ActivityPath {
	type Err = UrlError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for ActivityPath {
	type Error = UrlError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<ActivityPath> for String {
	fn from(path: ActivityPath) -> Self {
		path.to_string()
	}
}

/// Positional arguments passed to `on_start` and layout callbacks.
///
/// Route patterns produce arguments in the order their parameters appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Vec<String>);

impl Arguments {
	/// Creates an empty argument list.
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Returns the argument at `index`.
	pub fn get(&self, index: usize) -> Option<&str> {
		self.0.get(index).map(String::as_str)
	}

	/// Returns the number of arguments.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` if there are no arguments.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the arguments in order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Returns the arguments as a slice.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}

	/// Appends an argument.
	pub fn push(&mut self, value: impl Into<String>) {
		self.0.push(value.into());
	}
}

impl From<Vec<String>> for Arguments {
	fn from(values: Vec<String>) -> Self {
		Self(values)
	}
}

impl From<Vec<&str>> for Arguments {
	fn from(values: Vec<&str>) -> Self {
		Self(values.into_iter().map(String::from).collect())
	}
}

impl<const N: usize> From<[&str; N]> for Arguments {
	fn from(values: [&str; N]) -> Self {
		Self(values.iter().map(|v| v.to_string()).collect())
	}
}

impl FromIterator<String> for Arguments {
	fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl fmt::Display for Arguments {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}]", self.0.join(", "))
	}
}
