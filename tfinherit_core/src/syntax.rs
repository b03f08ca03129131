//! Text conventions shared by the parser and the generator.

/// Prefix of a variable reference, as in `var.region`.
pub const REFERENCE_PREFIX: &str = "var";

/// Prefix that disables an attribute, as in `# region = var.region`.
pub const COMMENT_PREFIX: &str = "#";

/// Line placed right before a variable declaration whose value must survive
/// regeneration of the inherited variables file.
pub const OVERRIDE_DECORATOR: &str = "# override";

/// Start of every comment line the generator inserts to label a group.
pub const GENERATED_DELIMITER_PREFIX: &str = "#~";

/// Indentation of top level attributes inside a block.
pub const ATTRIBUTE_INDENT: &str = "  ";

/// Attributes of a module block that are never module variables.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
	"source",
	"version",
	"count",
	"for_each",
	"lifecycle",
	"name",
	"providers",
	"depends_on",
];

pub const SOURCE_ATTRIBUTE: &str = "source";

/// Name of a module's default variables file, always listed first.
pub const DEFAULT_VARIABLE_FILE: &str = "variables.tf";

/// Prefix of variable file names inside a module source folder.
pub const DEFAULT_VARIABLE_FILE_PREFIX: &str = "variables";

/// Extension of configuration files.
pub const FILE_EXTENSION: &str = ".tf";

/// The value of a pass-through assignment for `name`.
pub fn pass_through(name: &str) -> String {
	format!("{REFERENCE_PREFIX}.{name}")
}

/// Whether the line is a comment (ignoring indentation).
pub fn is_comment_line(line: &str) -> bool {
	let trimmed = line.trim_start();
	trimmed.starts_with(COMMENT_PREFIX) || trimmed.starts_with("//")
}

/// Whether the line is a group label written by the generator.
pub fn is_generated_delimiter(line: &str) -> bool {
	line.trim_start().starts_with(GENERATED_DELIMITER_PREFIX)
}

/// Whether `name` is a valid attribute or variable identifier.
pub fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	chars
		.next()
		.is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Remove the comment decorator from an attribute key.
///
/// Returns whether a decorator was present and the bare key.
pub fn strip_comment_decorator(key: &str) -> (bool, &str) {
	match key.strip_prefix(COMMENT_PREFIX) {
		Some(rest) => (true, rest.trim_start_matches(COMMENT_PREFIX).trim_start()),
		None => (false, key),
	}
}

/// Strip one pair of surrounding double quotes.
pub fn unquote(value: &str) -> &str {
	value
		.strip_prefix('"')
		.and_then(|rest| rest.strip_suffix('"'))
		.unwrap_or(value)
}
