//! Fragment route patterns.
//!
//! Patterns use the conventional fragment-router syntax:
//!
//! - `users` - literal segments, matched exactly
//! - `users/:id` - `:name` captures a single segment (no `/`)
//! - `files/*path` - `*name` captures the rest of the fragment, including `/`
//! - `docs/:section(/:page)` - parenthesised parts are optional
//!
//! Leading `#` and `/` characters are insignificant, so `/users/:id` and
//! `users/:id` describe the same route. A query string on the matched
//! fragment (`?a=b`) is ignored.

use crate::error::{UrlError, UrlResult};
use crate::path::Arguments;
use std::fmt;

/// Maximum allowed length for a route pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a route pattern.
const MAX_PATTERN_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Strips the insignificant leading `#` and `/` characters from a fragment.
pub fn normalize_fragment(fragment: &str) -> &str {
	fragment.trim_start_matches('#').trim_start_matches('/')
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Literal(String),
	Param(String),
	Splat(String),
	Optional(Vec<Token>),
}

/// A compiled fragment route pattern.
///
/// # Examples
///
/// ```
/// use reinhardt_activity_urls::RoutePattern;
///
/// let pattern = RoutePattern::new("/users/:id").unwrap();
/// let args = pattern.matches("/users/42").unwrap();
/// assert_eq!(args.get(0), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
	/// The pattern as registered, without leading `#`/`/`.
	pattern: String,
	tokens: Vec<Token>,
	regex: regex::Regex,
	param_names: Vec<String>,
}

impl RoutePattern {
	/// Compiles a pattern.
	///
	/// # Errors
	///
	/// Returns [`UrlError::InvalidPattern`] if:
	/// - the pattern exceeds 1024 bytes or 32 segments
	/// - parentheses are unbalanced
	/// - a parameter name repeats
	/// - the compiled regex exceeds its size limit
	pub fn new(pattern: &str) -> UrlResult<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(UrlError::invalid_pattern(
				pattern,
				format!(
					"length {} exceeds maximum allowed length of {} bytes",
					pattern.len(),
					MAX_PATTERN_LENGTH
				),
			));
		}

		let normalized = normalize_fragment(pattern);
		let segment_count = normalized.split('/').count();
		if segment_count > MAX_PATTERN_SEGMENTS {
			return Err(UrlError::invalid_pattern(
				pattern,
				format!(
					"{} segments exceed maximum of {}",
					segment_count, MAX_PATTERN_SEGMENTS
				),
			));
		}

		let tokens = Self::tokenize(pattern, normalized)?;

		let mut param_names = Vec::new();
		collect_param_names(&tokens, &mut param_names);
		for (i, name) in param_names.iter().enumerate() {
			if param_names[..i].contains(name) {
				return Err(UrlError::invalid_pattern(
					pattern,
					format!("duplicate parameter '{}'", name),
				));
			}
		}

		let mut regex_str = String::from("^");
		write_regex(&tokens, &mut regex_str);
		regex_str.push_str(r"(?:\?.*)?$");

		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| UrlError::invalid_pattern(pattern, e.to_string()))?;

		Ok(Self {
			pattern: normalized.to_string(),
			tokens,
			regex,
			param_names,
		})
	}

	/// Splits the pattern into literal, parameter, splat and optional tokens.
	fn tokenize(original: &str, pattern: &str) -> UrlResult<Vec<Token>> {
		let mut stack: Vec<Vec<Token>> = vec![Vec::new()];
		let mut literal = String::new();
		let mut chars = pattern.chars().peekable();

		fn flush(literal: &mut String, stack: &mut [Vec<Token>]) {
			if !literal.is_empty() {
				if let Some(top) = stack.last_mut() {
					top.push(Token::Literal(std::mem::take(literal)));
				}
			}
		}

		while let Some(c) = chars.next() {
			match c {
				':' | '*' => {
					let mut name = String::new();
					while let Some(&next) = chars.peek() {
						if next.is_alphanumeric() || next == '_' {
							name.push(next);
							chars.next();
						} else {
							break;
						}
					}
					if name.is_empty() {
						if c == ':' {
							return Err(UrlError::invalid_pattern(
								original,
								"':' must be followed by a parameter name",
							));
						}
						name.push_str("splat");
					}
					flush(&mut literal, &mut stack);
					let token = if c == ':' {
						Token::Param(name)
					} else {
						Token::Splat(name)
					};
					if let Some(top) = stack.last_mut() {
						top.push(token);
					}
				}
				'(' => {
					flush(&mut literal, &mut stack);
					stack.push(Vec::new());
				}
				')' => {
					flush(&mut literal, &mut stack);
					if stack.len() < 2 {
						return Err(UrlError::invalid_pattern(original, "unbalanced ')'"));
					}
					let group = stack.pop().unwrap_or_default();
					if let Some(top) = stack.last_mut() {
						top.push(Token::Optional(group));
					}
				}
				_ => literal.push(c),
			}
		}
		flush(&mut literal, &mut stack);

		if stack.len() != 1 {
			return Err(UrlError::invalid_pattern(original, "unbalanced '('"));
		}
		Ok(stack.pop().unwrap_or_default())
	}

	/// Returns the normalized pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the parameter names in the order they appear.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns `true` if the pattern has no parameters or optional parts.
	pub fn is_exact(&self) -> bool {
		self.tokens.iter().all(|t| matches!(t, Token::Literal(_)))
	}

	/// Checks if this pattern would match the given fragment.
	pub fn is_match(&self, fragment: &str) -> bool {
		self.regex.is_match(normalize_fragment(fragment))
	}

	/// Matches a fragment and extracts its positional arguments.
	///
	/// Parameters inside optional groups that did not participate in the
	/// match are omitted. Captured values are percent-decoded; a value that
	/// does not decode is kept verbatim.
	pub fn matches(&self, fragment: &str) -> Option<Arguments> {
		let caps = self.regex.captures(normalize_fragment(fragment))?;

		Some(
			caps.iter()
				.skip(1)
				.flatten()
				.map(|m| {
					urlencoding::decode(m.as_str())
						.map(|decoded| decoded.into_owned())
						.unwrap_or_else(|_| m.as_str().to_string())
				})
				.collect(),
		)
	}

	/// Builds a fragment from positional arguments.
	///
	/// Optional groups are emitted only when every parameter inside them has
	/// an argument. Returns `None` when a required parameter is missing.
	pub fn reverse(&self, arguments: &Arguments) -> Option<String> {
		let mut pos = 0;
		let mut out = String::new();
		if write_reverse(&self.tokens, arguments.as_slice(), &mut pos, &mut out) {
			Some(out)
		} else {
			None
		}
	}
}

fn collect_param_names(tokens: &[Token], names: &mut Vec<String>) {
	for token in tokens {
		match token {
			Token::Param(name) | Token::Splat(name) => names.push(name.clone()),
			Token::Optional(inner) => collect_param_names(inner, names),
			Token::Literal(_) => {}
		}
	}
}

fn write_regex(tokens: &[Token], out: &mut String) {
	for token in tokens {
		match token {
			Token::Literal(text) => out.push_str(&regex::escape(text)),
			Token::Param(_) => out.push_str("([^/?]+)"),
			Token::Splat(_) => out.push_str("([^?]*?)"),
			Token::Optional(inner) => {
				out.push_str("(?:");
				write_regex(inner, out);
				out.push_str(")?");
			}
		}
	}
}

fn count_params(tokens: &[Token]) -> usize {
	tokens
		.iter()
		.map(|t| match t {
			Token::Param(_) | Token::Splat(_) => 1,
			Token::Optional(inner) => count_params(inner),
			Token::Literal(_) => 0,
		})
		.sum()
}

fn write_reverse(tokens: &[Token], values: &[String], pos: &mut usize, out: &mut String) -> bool {
	for token in tokens {
		match token {
			Token::Literal(text) => out.push_str(text),
			Token::Param(_) | Token::Splat(_) => match values.get(*pos) {
				Some(value) => {
					out.push_str(value);
					*pos += 1;
				}
				None => return false,
			},
			Token::Optional(inner) => {
				if values.len() - *pos >= count_params(inner)
					&& !write_reverse(inner, values, pos, out)
				{
					return false;
				}
			}
		}
	}
	true
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}
