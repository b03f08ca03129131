use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::InheritResult;
use crate::VariableFile;
use crate::parser::parse_file;
use crate::reader::not_found_or_io;
use crate::syntax::DEFAULT_VARIABLE_FILE;
use crate::syntax::FILE_EXTENSION;

/// Finds the folder holding a module's source on local disk.
pub trait ModuleResolver: Sync {
	/// The folder of module `name` whose `source` attribute is `source`, or
	/// `None` when the module is not available locally.
	fn resolve(&self, name: &str, source: &str) -> Option<PathBuf>;
}

/// Resolves local (`./` and `../`) sources against a root folder.
///
/// Explicit per-module folders take precedence, so modules with a registry
/// or git source can be read from wherever they were downloaded. Nothing is
/// ever fetched.
#[derive(Debug, Clone, Default)]
pub struct LocalModuleResolver {
	root: PathBuf,
	sources: BTreeMap<String, PathBuf>,
}

impl LocalModuleResolver {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			sources: BTreeMap::new(),
		}
	}

	/// Use `folder` (relative to the root) for module `name`.
	#[must_use]
	pub fn with_source(mut self, name: impl Into<String>, folder: impl Into<PathBuf>) -> Self {
		self.sources.insert(name.into(), folder.into());
		self
	}

	#[must_use]
	pub fn with_sources(mut self, sources: BTreeMap<String, PathBuf>) -> Self {
		self.sources.extend(sources);
		self
	}
}

impl ModuleResolver for LocalModuleResolver {
	fn resolve(&self, name: &str, source: &str) -> Option<PathBuf> {
		if let Some(folder) = self.sources.get(name) {
			return Some(self.root.join(folder));
		}

		is_local_source(source).then(|| self.root.join(source))
	}
}

/// Whether `source` is a path on local disk rather than a registry address
/// or a remote url.
pub fn is_local_source(source: &str) -> bool {
	source == "." || source == ".." || source.starts_with("./") || source.starts_with("../")
}

/// Whether `file_name` names a variable file.
pub fn is_variable_file(file_name: &str, prefix: &str) -> bool {
	file_name.starts_with(prefix) && file_name.ends_with(FILE_EXTENSION)
}

/// Sort variable file names: the default file first, then by name.
pub fn sort_variable_files(file_names: &mut [String]) {
	file_names.sort_by(|a, b| {
		(a != DEFAULT_VARIABLE_FILE)
			.cmp(&(b != DEFAULT_VARIABLE_FILE))
			.then_with(|| a.cmp(b))
	});
}

/// Names of the variable files in `folder`, in generation order.
///
/// A missing folder is reported as [`FileNotFound`](crate::InheritError::FileNotFound).
pub fn list_variable_files(folder: &Path, prefix: &str) -> InheritResult<Vec<String>> {
	let entries = std::fs::read_dir(folder).map_err(|error| not_found_or_io(error, folder))?;

	let mut file_names = Vec::new();

	for entry in entries {
		let entry = entry?;

		if !entry.file_type()?.is_file() {
			continue;
		}

		let Some(file_name) = entry.file_name().to_str().map(ToString::to_string) else {
			continue;
		};

		if is_variable_file(&file_name, prefix) {
			file_names.push(file_name);
		}
	}

	sort_variable_files(&mut file_names);

	Ok(file_names)
}

/// Parse every variable file in `folder`.
pub fn load_variable_files(folder: &Path, prefix: &str) -> InheritResult<Vec<VariableFile>> {
	list_variable_files(folder, prefix)?
		.into_iter()
		.map(|file_name| {
			let path = folder.join(&file_name);
			let content = parse_file(&path)?;

			for diagnostic in &content.diagnostics {
				tracing::warn!(path = %path.display(), ?diagnostic, "variable file is malformed");
			}

			Ok(VariableFile {
				path,
				file_name,
				content,
			})
		})
		.collect()
}
