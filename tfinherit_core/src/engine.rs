use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::time::UNIX_EPOCH;

use indexmap::IndexMap;
use serde::Serialize;

use crate::Content;
use crate::InheritError;
use crate::InheritResult;
use crate::ModuleVariableFiles;
use crate::ParseDiagnostic;
use crate::VariableFile;
use crate::config::TfInheritConfig;
use crate::generator::generate_inherited_file;
use crate::generator::generate_main_file;
use crate::module_source::LocalModuleResolver;
use crate::module_source::ModuleResolver;
use crate::module_source::load_variable_files;
use crate::parser::parse_content;
use crate::reader::read_file;

/// Where the files of a project live.
///
/// Use [`ProjectOptions::new`] for the defaults or
/// [`ProjectOptions::from_config`] to construct from a [`TfInheritConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
	pub root: PathBuf,
	/// Relative to `root`.
	pub main_file: PathBuf,
	/// Relative to `root`.
	pub inherited_file: PathBuf,
	pub variable_file_prefix: String,
	/// Module name to local folder, relative to `root`.
	pub sources: BTreeMap<String, PathBuf>,
}

impl ProjectOptions {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self::from_config(root, None)
	}

	pub fn from_config(root: impl Into<PathBuf>, config: Option<&TfInheritConfig>) -> Self {
		let config = config.cloned().unwrap_or_default();

		Self {
			root: root.into(),
			main_file: config.main_file,
			inherited_file: config.inherited_file,
			variable_file_prefix: config.variable_file_prefix,
			sources: config.sources,
		}
	}

	pub fn main_path(&self) -> PathBuf {
		self.root.join(&self.main_file)
	}

	pub fn inherited_path(&self) -> PathBuf {
		self.root.join(&self.inherited_file)
	}

	/// Module sources are relative to the folder of the main file.
	pub fn module_root(&self) -> PathBuf {
		self.main_path()
			.parent()
			.map_or_else(|| self.root.clone(), Path::to_path_buf)
	}

	/// A resolver for local sources honouring the configured `sources`.
	pub fn resolver(&self) -> LocalModuleResolver {
		let sources = self
			.sources
			.iter()
			.map(|(name, folder)| (name.clone(), self.root.join(folder)))
			.collect();

		LocalModuleResolver::new(self.module_root()).with_sources(sources)
	}
}

/// Everything read from disk for one generation.
#[derive(Debug, Clone)]
pub struct Project {
	pub main_path: PathBuf,
	pub main_text: String,
	pub main: Content,
	pub inherited_path: PathBuf,
	/// `None` until the inherited file is first generated.
	pub inherited_text: Option<String>,
	pub inherited: Option<Content>,
	/// Resolved folder of each module, `None` when it is not on local disk.
	pub folders: IndexMap<String, Option<PathBuf>>,
	pub files: ModuleVariableFiles,
}

/// Read and parse the main file, the inherited file and the variable files
/// of every module.
///
/// Fails before anything is generated when the main file is missing, holds
/// no module block, or ends inside a block.
pub fn scan_project(
	options: &ProjectOptions,
	resolver: &dyn ModuleResolver,
) -> InheritResult<Project> {
	let main_path = options.main_path();
	let inherited_path = options.inherited_path();

	let (main, inherited) = thread::scope(|scope| {
		let inherited = scope.spawn(|| load_optional(&inherited_path));
		let main = load(&main_path);

		(main, join(inherited))
	});
	let (main_text, main) = main?;
	let (inherited_text, inherited) = inherited?.unzip();

	if let Some(ParseDiagnostic::UnclosedBlock { kind, name, line }) = main.diagnostics.first() {
		return Err(InheritError::UnclosedBlock {
			kind: *kind,
			name: name.clone(),
			path: main_path,
			line: *line,
		});
	}

	if main.blocks.modules.is_empty() {
		return Err(InheritError::NoModuleFound { path: main_path });
	}

	let folders: IndexMap<String, Option<PathBuf>> = main
		.blocks
		.modules
		.values()
		.map(|module| {
			let folder = resolver.resolve(&module.name, &module.source);

			if folder.is_none() {
				tracing::warn!(
					module = %module.name,
					source = %module.source,
					"module source is not available locally"
				);
			}

			(module.name.clone(), folder)
		})
		.collect();

	let skipped_path = inherited_path.as_path();
	let files = thread::scope(|scope| {
		let handles: Vec<_> = folders
			.iter()
			.map(|(name, folder)| {
				let handle = scope.spawn(move || match folder {
					Some(folder) => load_module_files(name, folder, options, skipped_path),
					None => Ok(Vec::new()),
				});

				(name, handle)
			})
			.collect();

		handles
			.into_iter()
			.map(|(name, handle)| Ok((name.clone(), join(handle)?)))
			.collect::<InheritResult<ModuleVariableFiles>>()
	})?;

	Ok(Project {
		main_path,
		main_text,
		main,
		inherited_path,
		inherited_text,
		inherited,
		folders,
		files,
	})
}

/// Scan a project with config: loads the discovered project config at
/// `root` and reads modules through the local resolver.
pub fn scan_project_with_config(root: &Path) -> InheritResult<Project> {
	let config = TfInheritConfig::load(root)?;
	let options = ProjectOptions::from_config(root, config.as_ref());

	scan_project(&options, &options.resolver())
}

fn load(path: &Path) -> InheritResult<(String, Content)> {
	let text = read_file(path)?;
	let content = parse_content(&text);

	tracing::debug!(
		path = %path.display(),
		modules = content.blocks.modules.len(),
		variables = content.blocks.variables.len(),
		"parsed file"
	);

	Ok((text, content))
}

fn load_optional(path: &Path) -> InheritResult<Option<(String, Content)>> {
	match load(path) {
		Ok(loaded) => Ok(Some(loaded)),
		Err(error) if error.is_not_found() => {
			tracing::debug!(path = %path.display(), "file does not exist yet");
			Ok(None)
		}
		Err(error) => Err(error),
	}
}

fn load_module_files(
	name: &str,
	folder: &Path,
	options: &ProjectOptions,
	inherited_path: &Path,
) -> InheritResult<Vec<VariableFile>> {
	match load_variable_files(folder, &options.variable_file_prefix) {
		Ok(files) => {
			let files: Vec<VariableFile> = files
				.into_iter()
				.filter(|file| file.path != inherited_path)
				.collect();

			tracing::debug!(
				module = name,
				folder = %folder.display(),
				files = files.len(),
				"loaded variable files"
			);

			Ok(files)
		}
		Err(error) if error.is_not_found() => {
			tracing::warn!(
				module = name,
				folder = %folder.display(),
				"module folder does not exist"
			);
			Ok(Vec::new())
		}
		Err(error) => Err(error),
	}
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
	handle
		.join()
		.unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}

/// A generated file next to what is currently on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
	pub path: PathBuf,
	/// `None` when the file does not exist.
	pub current: Option<String>,
	pub content: String,
}

impl GeneratedFile {
	/// Whether writing the file would change the disk. An empty file is
	/// never created.
	pub fn is_changed(&self) -> bool {
		match &self.current {
			Some(current) => *current != self.content,
			None => !self.content.is_empty(),
		}
	}
}

/// Result of generating a project.
#[derive(Debug, Clone)]
pub struct UpdateResult {
	/// The inherited file, then the main file.
	pub files: Vec<GeneratedFile>,
}

impl UpdateResult {
	pub fn changed(&self) -> impl Iterator<Item = &GeneratedFile> {
		self.files.iter().filter(|file| file.is_changed())
	}

	pub fn is_up_to_date(&self) -> bool {
		self.changed().next().is_none()
	}
}

/// Result of checking a project for stale files.
#[derive(Debug, Clone)]
pub struct CheckResult {
	/// Files whose content differs from what would be generated.
	pub stale: Vec<GeneratedFile>,
}

impl CheckResult {
	/// Returns true if both files are up to date.
	pub fn is_ok(&self) -> bool {
		self.stale.is_empty()
	}
}

/// Generate both files of the project.
pub fn compute_updates(project: &Project) -> UpdateResult {
	let inherited = GeneratedFile {
		path: project.inherited_path.clone(),
		current: project.inherited_text.clone(),
		content: generate_inherited_file(
			&project.main,
			project.inherited.as_ref(),
			&project.files,
		),
	};
	let main = GeneratedFile {
		path: project.main_path.clone(),
		current: Some(project.main_text.clone()),
		content: generate_main_file(&project.main, &project.files),
	};

	for file in [&inherited, &main] {
		tracing::info!(
			path = %file.path.display(),
			changed = file.is_changed(),
			"generated file"
		);
	}

	UpdateResult {
		files: vec![inherited, main],
	}
}

/// Check whether the files of the project are up to date.
pub fn check_project(project: &Project) -> CheckResult {
	let stale = compute_updates(project)
		.files
		.into_iter()
		.filter(GeneratedFile::is_changed)
		.collect();

	CheckResult { stale }
}

/// Write the changed files back to disk. Returns how many were written.
pub fn write_updates(updates: &UpdateResult) -> InheritResult<usize> {
	let mut written = 0;

	for file in updates.changed() {
		write_atomically(&file.path, &file.content)?;
		tracing::debug!(path = %file.path.display(), "wrote file");
		written += 1;
	}

	Ok(written)
}

/// Write to a sibling temporary file and rename it over `path`, so readers
/// never see a partially written file.
fn write_atomically(path: &Path, content: &str) -> InheritResult<()> {
	let file_name = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	let temp_path = path.with_file_name(format!(
		".{file_name}.tmp-{}-{}",
		std::process::id(),
		std::time::SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	));

	std::fs::write(&temp_path, content)?;

	if let Err(error) = std::fs::rename(&temp_path, path) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(error.into());
	}

	Ok(())
}
