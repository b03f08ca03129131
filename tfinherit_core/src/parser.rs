use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::BlockKind;
use crate::Blocks;
use crate::ClosedBlock;
use crate::Content;
use crate::InheritResult;
use crate::Line;
use crate::ModuleBlock;
use crate::ParseDiagnostic;
use crate::VariableAttribute;
use crate::VariableBlock;
use crate::attribute::split_attribute;
use crate::reader::scan_file;
use crate::reader::scan_str;
use crate::syntax::COMMENT_PREFIX;
use crate::syntax::RESERVED_ATTRIBUTES;
use crate::syntax::SOURCE_ATTRIBUTE;
use crate::syntax::is_comment_line;
use crate::syntax::is_generated_delimiter;
use crate::syntax::is_identifier;
use crate::syntax::pass_through;
use crate::syntax::strip_comment_decorator;
use crate::syntax::unquote;

static MODULE_DECLARATION: LazyLock<Regex> =
	LazyLock::new(|| pattern(r#"^module\s+"([^"]+)"\s*\{$"#));
static VARIABLE_DECLARATION: LazyLock<Regex> =
	LazyLock::new(|| pattern(r#"^variable\s+"([^"]+)"\s*\{$"#));
static EMPTY_VARIABLE_DECLARATION: LazyLock<Regex> =
	LazyLock::new(|| pattern(r#"^variable\s+"([^"]+)"\s*\{\s*\}$"#));
static OVERRIDE_DECORATOR: LazyLock<Regex> = LazyLock::new(|| pattern(r"^#\s*override$"));
static VARIABLE_REFERENCE: LazyLock<Regex> =
	LazyLock::new(|| pattern(r"\bvar\.([A-Za-z_][A-Za-z0-9_-]*)"));

fn pattern(source: &str) -> Regex {
	Regex::new(source).unwrap_or_else(|e| panic!("invalid pattern `{source}`: {e}"))
}

/// Parse configuration text into its [`Content`].
///
/// Parsing never fails: text that does not look like a block or an attribute
/// is kept as ordinary content. Blocks left open at the end of the input are
/// reported in [`Content::diagnostics`].
pub fn parse_content(text: &str) -> Content {
	let mut parser = ContentParser::default();
	let lines = scan_str(text, |line, retained| parser.visit(line, retained));
	parser.finish(lines)
}

/// Parse the file at `path`.
pub fn parse_file(path: &Path) -> InheritResult<Content> {
	let mut parser = ContentParser::default();
	let lines = scan_file(path, |line, retained| parser.visit(line, retained))?;
	let content = parser.finish(lines);

	tracing::debug!(
		path = %path.display(),
		modules = content.blocks.modules.len(),
		variables = content.blocks.variables.len(),
		"parsed file"
	);

	Ok(content)
}

/// An attribute whose value continues on the following lines.
#[derive(Debug)]
struct PendingAttribute {
	name: String,
	attribute: VariableAttribute,
	continuation: Continuation,
}

/// What keeps a multi-line value open.
#[derive(Debug)]
enum Continuation {
	/// Unclosed `(`, `[` and `{` of the value.
	Nesting(i64),
	/// The marker closing a heredoc.
	Heredoc(String),
}

impl Continuation {
	/// How a value starting with `value` continues, or `None` when the value
	/// is complete on its first line.
	fn after(value: &str) -> Option<Self> {
		if let Some(marker) = value.strip_prefix("<<") {
			let marker = marker.trim_start_matches('-').trim();
			return (!marker.is_empty()).then(|| Self::Heredoc(marker.to_string()));
		}

		let depth = nesting_delta(value);
		(depth > 0).then_some(Self::Nesting(depth))
	}

	/// Consume the next line of the value. Returns whether the value is
	/// complete.
	fn feed(&mut self, line: &str) -> bool {
		match self {
			Self::Nesting(depth) => {
				*depth += nesting_delta(line);
				*depth <= 0
			}
			Self::Heredoc(marker) => line.trim() == marker.as_str(),
		}
	}
}

#[derive(Debug)]
struct ModuleBuilder {
	block: ModuleBlock,
	/// 1-indexed line of the declaration.
	line: usize,
	/// Index of the declaration in the retained lines.
	opening_index: usize,
	current: Option<PendingAttribute>,
}

impl ModuleBuilder {
	fn flush(&mut self) {
		let Some(PendingAttribute {
			name, mut attribute, ..
		}) = self.current.take()
		else {
			return;
		};

		while attribute.lines.len() > 1
			&& attribute.lines.last().is_some_and(|line| line.trim().is_empty())
		{
			attribute.lines.pop();
		}

		self.block.variables.insert(name, attribute);
	}

	/// Record the references of a value. `own_name` is the attribute the
	/// value belongs to; a reference to it is not a reference to another
	/// variable of the module.
	fn collect_references(
		&mut self,
		text: &str,
		own_name: Option<&str>,
		variable_names: &mut BTreeSet<String>,
	) {
		for name in references(text) {
			if own_name != Some(name) {
				self.block.referenced_variable_names.insert(name.to_string());
			}
			variable_names.insert(name.to_string());
		}
	}
}

#[derive(Debug)]
struct VariableBuilder {
	block: VariableBlock,
	line: usize,
}

#[derive(Debug, Default)]
enum State {
	#[default]
	Outside,
	InsideModule(ModuleBuilder),
	InsideVariable(VariableBuilder),
}

/// Line-driven state machine building a [`Content`].
///
/// Feed every line through [`ContentParser::visit`] (the visitor of
/// [`scan_lines`](crate::reader::scan_lines)) and collect the result with
/// [`ContentParser::finish`].
#[derive(Debug, Default)]
pub struct ContentParser {
	state: State,
	pending_override: bool,
	line_number: usize,
	blocks: Blocks,
	variable_names: BTreeSet<String>,
}

impl ContentParser {
	/// Process one line. Returns whether the line is retained.
	pub fn visit(&mut self, line: &str, retained: &mut Vec<Line>) -> bool {
		self.line_number += 1;

		if is_generated_delimiter(line) {
			return false;
		}

		let is_blank = line.trim().is_empty();
		let follows_blank = retained.last().is_some_and(Line::is_blank);

		let keep = match std::mem::take(&mut self.state) {
			State::Outside => self.visit_outside(line, is_blank, retained),
			State::InsideModule(builder) => self.visit_module(builder, line, is_blank, retained),
			State::InsideVariable(builder) => {
				self.visit_variable(builder, line, is_blank, retained)
			}
		};

		keep && !(is_blank && follows_blank)
	}

	/// Finish parsing and assemble the [`Content`].
	pub fn finish(self, lines: Vec<Line>) -> Content {
		let mut diagnostics = Vec::new();

		match self.state {
			State::Outside => {}
			State::InsideModule(builder) => {
				diagnostics.push(ParseDiagnostic::UnclosedBlock {
					kind: BlockKind::Module,
					name: builder.block.name,
					line: builder.line,
				});
			}
			State::InsideVariable(builder) => {
				diagnostics.push(ParseDiagnostic::UnclosedBlock {
					kind: BlockKind::Variable,
					name: builder.block.name,
					line: builder.line,
				});
			}
		}

		Content {
			lines,
			blocks: self.blocks,
			variable_names: self.variable_names,
			diagnostics,
		}
	}

	fn visit_outside(&mut self, line: &str, is_blank: bool, retained: &[Line]) -> bool {
		if OVERRIDE_DECORATOR.is_match(line) {
			self.pending_override = true;
			return true;
		}

		if let Some(name) = capture_name(&MODULE_DECLARATION, line) {
			self.pending_override = false;
			self.state = State::InsideModule(ModuleBuilder {
				block: ModuleBlock {
					name: name.to_string(),
					..ModuleBlock::default()
				},
				line: self.line_number,
				opening_index: retained.len(),
				current: None,
			});
			return true;
		}

		if let Some(name) = capture_name(&VARIABLE_DECLARATION, line) {
			self.state = State::InsideVariable(VariableBuilder {
				block: VariableBlock {
					name: name.to_string(),
					is_override: std::mem::take(&mut self.pending_override),
					lines: Vec::new(),
				},
				line: self.line_number,
			});
			return true;
		}

		if let Some(name) = capture_name(&EMPTY_VARIABLE_DECLARATION, line) {
			let block = VariableBlock {
				name: name.to_string(),
				is_override: std::mem::take(&mut self.pending_override),
				lines: Vec::new(),
			};
			self.blocks.variables.insert(block.name.clone(), block);
			return true;
		}

		if !is_blank {
			self.pending_override = false;

			if !is_comment_line(line) {
				self.variable_names
					.extend(references(line).map(ToString::to_string));
			}
		}

		true
	}

	fn visit_module(
		&mut self,
		mut builder: ModuleBuilder,
		line: &str,
		is_blank: bool,
		retained: &mut Vec<Line>,
	) -> bool {
		if line == "}" {
			builder.flush();

			// The spacing before the generated assignments is re-inserted on
			// every generation.
			while retained.len() > builder.opening_index + 1
				&& retained.last().is_some_and(Line::is_blank)
			{
				retained.pop();
			}

			if let Some(last) = retained.last_mut() {
				last.closes = Some(ClosedBlock {
					kind: BlockKind::Module,
					name: builder.block.name.clone(),
				});
			}

			tracing::trace!(
				module = %builder.block.name,
				variables = builder.block.variables.len(),
				"closed module block"
			);
			self.blocks
				.modules
				.insert(builder.block.name.clone(), builder.block);
			return true;
		}

		if let Some(current) = builder.current.as_mut() {
			let ends_with_blank = current
				.attribute
				.lines
				.last()
				.is_some_and(|previous| previous.trim().is_empty());

			if !(is_blank && ends_with_blank) {
				current.attribute.lines.push(line.to_string());
			}

			let code = if current.attribute.is_commented {
				line.trim_start().trim_start_matches(COMMENT_PREFIX)
			} else {
				line
			};
			let is_complete = current.continuation.feed(code);

			if !is_comment_line(line) {
				let own_name = current.name.clone();
				builder.collect_references(line, Some(&own_name), &mut self.variable_names);
			}

			if is_complete {
				builder.flush();
			}

			self.state = State::InsideModule(builder);
			return false;
		}

		if let Some(attribute) = split_attribute(line).filter(|attribute| attribute.indent == 2) {
			let (is_commented, key) = strip_comment_decorator(attribute.key);
			let is_pass_through = attribute.value == pass_through(key);

			if is_identifier(key) {
				// `name = var.name` passes a module variable called `name`.
				let is_reserved = RESERVED_ATTRIBUTES.contains(&key) && !is_pass_through;

				if is_reserved && !is_commented {
					if key == SOURCE_ATTRIBUTE {
						builder.block.source = unquote(attribute.value).to_string();
					}

					builder.block.reserved_attributes.insert(key.to_string());
					builder.collect_references(attribute.value, None, &mut self.variable_names);
					self.state = State::InsideModule(builder);
					return true;
				}

				if !is_reserved {
					let is_custom = !is_pass_through;

					if is_commented || is_custom {
						let attribute_value = VariableAttribute {
							is_commented,
							is_custom,
							lines: vec![attribute.value.to_string()],
						};

						match Continuation::after(attribute.value) {
							Some(continuation) => {
								builder.current = Some(PendingAttribute {
									name: key.to_string(),
									attribute: attribute_value,
									continuation,
								});
							}
							None => {
								builder
									.block
									.variables
									.insert(key.to_string(), attribute_value);
							}
						}
					}

					if !is_commented && is_custom {
						builder.collect_references(
							attribute.value,
							Some(key),
							&mut self.variable_names,
						);
					}

					self.state = State::InsideModule(builder);
					return false;
				}
			}
		}

		if !is_comment_line(line) {
			builder.collect_references(line, None, &mut self.variable_names);
		}

		self.state = State::InsideModule(builder);
		true
	}

	fn visit_variable(
		&mut self,
		mut builder: VariableBuilder,
		line: &str,
		is_blank: bool,
		retained: &mut [Line],
	) -> bool {
		if line == "}" {
			if let Some(last) = retained.last_mut() {
				last.closes = Some(ClosedBlock {
					kind: BlockKind::Variable,
					name: builder.block.name.clone(),
				});
			}

			self.blocks
				.variables
				.insert(builder.block.name.clone(), builder.block);
			return true;
		}

		if is_blank {
			self.state = State::InsideVariable(builder);
			return false;
		}

		builder.block.lines.push(line.to_string());
		self.state = State::InsideVariable(builder);
		true
	}
}

fn capture_name<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
	pattern
		.captures(line)
		.and_then(|captures| captures.get(1))
		.map(|name| name.as_str())
}

/// Names of all `var.<name>` references in `text`.
fn references(text: &str) -> impl Iterator<Item = &str> {
	VARIABLE_REFERENCE
		.captures_iter(text)
		.filter_map(|captures| captures.get(1))
		.map(|name| name.as_str())
}

/// Change in `(`, `[` and `{` nesting over `text`. Brackets inside string
/// literals and after a comment marker do not count.
fn nesting_delta(text: &str) -> i64 {
	let mut delta = 0;
	let mut in_string = false;
	let mut escaped = false;
	let mut chars = text.chars().peekable();

	while let Some(c) = chars.next() {
		if in_string {
			match c {
				_ if escaped => escaped = false,
				'\\' => escaped = true,
				'"' => in_string = false,
				_ => {}
			}
			continue;
		}

		match c {
			'"' => in_string = true,
			'(' | '[' | '{' => delta += 1,
			')' | ']' | '}' => delta -= 1,
			'#' => break,
			'/' if chars.peek() == Some(&'/') => break,
			_ => {}
		}
	}

	delta
}
