use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::BlockKind;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum InheritError {
	#[error(transparent)]
	#[diagnostic(code(tfinherit::io_error))]
	Io(#[from] std::io::Error),

	#[error("file not found: `{}`", path.display())]
	#[diagnostic(code(tfinherit::file_not_found))]
	FileNotFound { path: PathBuf },

	#[error("NO_MODULE_FOUND: no module block found in `{}`", path.display())]
	#[diagnostic(
		code(tfinherit::no_module_found),
		help("the main file must contain at least one `module \"<name>\" {{` block")
	)]
	NoModuleFound { path: PathBuf },

	#[error("{kind} block `{name}` opened at {}:{line} is never closed", path.display())]
	#[diagnostic(
		code(tfinherit::unclosed_block),
		help("close the block with a lone `}}` at the start of a line")
	)]
	UnclosedBlock {
		kind: BlockKind,
		name: String,
		path: PathBuf,
		line: usize,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tfinherit::config_parse),
		help("check that tfinherit.toml is valid TOML")
	)]
	ConfigParse(String),
}

impl InheritError {
	/// Returns true when the error means a file or folder does not exist.
	/// Callers use this to treat an absent companion file or module folder
	/// as empty input.
	pub fn is_not_found(&self) -> bool {
		match self {
			Self::FileNotFound { .. } => true,
			Self::Io(error) => error.kind() == std::io::ErrorKind::NotFound,
			_ => false,
		}
	}
}

pub type InheritResult<T> = Result<T, InheritError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
