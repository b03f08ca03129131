use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

/// The two kinds of top level blocks the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockKind {
	/// A `module "<name>" { ... }` call site.
	Module,
	/// A `variable "<name>" { ... }` declaration.
	Variable,
}

impl fmt::Display for BlockKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Module => write!(f, "module"),
			Self::Variable => write!(f, "variable"),
		}
	}
}

/// Marks the retained line that precedes the closing brace of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedBlock {
	pub kind: BlockKind,
	pub name: String,
}

/// A retained line of a parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
	/// The line text with trailing whitespace removed.
	pub value: String,
	/// Set when the next retained line is the closing brace of a block.
	/// Generated content for that block is injected right after this line.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub closes: Option<ClosedBlock>,
}

impl Line {
	pub fn new(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			closes: None,
		}
	}

	pub fn is_blank(&self) -> bool {
		self.value.trim().is_empty()
	}
}

/// A variable explicitly set inside a module block.
///
/// Pass-through assignments (`name = var.name`) are never recorded since
/// the generator rewrites them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableAttribute {
	/// The assignment is disabled with a leading comment decorator.
	pub is_commented: bool,
	/// The value is something other than `var.<same name>`.
	pub is_custom: bool,
	/// The right hand side. The first entry is the trimmed value on the
	/// assignment line, further entries are raw continuation lines.
	pub lines: Vec<String>,
}

impl VariableAttribute {
	pub fn is_multi_line(&self) -> bool {
		self.lines.len() > 1
	}
}

/// A `module` call site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleBlock {
	pub name: String,
	/// The unquoted `source` attribute.
	pub source: String,
	/// Variables explicitly set (custom or commented), in encounter order.
	pub variables: IndexMap<String, VariableAttribute>,
	/// Variables referenced by the block's values, other than an
	/// attribute's reference to its own name.
	pub referenced_variable_names: BTreeSet<String>,
	/// Reserved attributes the block sets by hand, such as `source`, `count`
	/// or a `name` whose value is not `var.name`. The generator never
	/// assigns these.
	pub reserved_attributes: BTreeSet<String>,
}

/// A `variable` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableBlock {
	pub name: String,
	/// Preceded by the `# override` decorator.
	pub is_override: bool,
	/// Non-blank body lines between the declaration and the closing brace.
	pub lines: Vec<String>,
}

/// Either kind of block, used when a caller needs to treat them uniformly.
#[derive(Debug, Clone, Copy)]
pub enum Block<'a> {
	Module(&'a ModuleBlock),
	Variable(&'a VariableBlock),
}

/// All blocks found in a file, keyed by name in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Blocks {
	pub modules: IndexMap<String, ModuleBlock>,
	pub variables: IndexMap<String, VariableBlock>,
}

impl Blocks {
	/// Look up a block by kind and name.
	pub fn get(&self, kind: BlockKind, name: &str) -> Option<Block<'_>> {
		match kind {
			BlockKind::Module => self.modules.get(name).map(Block::Module),
			BlockKind::Variable => self.variables.get(name).map(Block::Variable),
		}
	}
}

/// A problem found while parsing that does not stop the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum ParseDiagnostic {
	/// The input ended while a block was still open.
	UnclosedBlock {
		kind: BlockKind,
		name: String,
		/// 1-indexed line of the block declaration.
		line: usize,
	},
}

/// The parsed form of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Content {
	/// Lines kept for replay, annotated with block endings.
	pub lines: Vec<Line>,
	pub blocks: Blocks,
	/// Every `var.<name>` referenced outside comments and variable blocks.
	pub variable_names: BTreeSet<String>,
	pub diagnostics: Vec<ParseDiagnostic>,
}

/// A parsed variable-declaration file of a module source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableFile {
	pub path: PathBuf,
	pub file_name: String,
	pub content: Content,
}

/// Variable files of each module, keyed by module name.
pub type ModuleVariableFiles = IndexMap<String, Vec<VariableFile>>;
