/// A line of the form `key = value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLine<'a> {
	/// Trimmed text left of the first `=`.
	pub key: &'a str,
	/// Trimmed text right of the first `=`.
	pub value: &'a str,
	/// Column of the first non-whitespace character of the key.
	pub indent: usize,
}

/// Split `line` on its first `=`.
///
/// Returns `None` when there is no `=` or nothing precedes it.
pub fn split_attribute(line: &str) -> Option<AttributeLine<'_>> {
	let (left, right) = line.split_once('=')?;
	let indent = left.find(|c: char| !c.is_whitespace())?;

	Some(AttributeLine {
		key: left.trim(),
		value: right.trim(),
		indent,
	})
}
