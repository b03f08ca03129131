use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::InheritError;
use crate::InheritResult;
use crate::syntax::DEFAULT_VARIABLE_FILE_PREFIX;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"tfinherit.toml",
	".tfinherit.toml",
	".config/tfinherit.toml",
];

pub const DEFAULT_MAIN_FILE: &str = "main.tf";
pub const DEFAULT_INHERITED_FILE: &str = "variables-inherited.tf";

/// Configuration loaded from a `tfinherit.toml` file.
///
/// ```toml
/// main_file = "main.tf"
/// inherited_file = "variables-inherited.tf"
/// variable_file_prefix = "variables"
///
/// [sources]
/// api = ".terraform/modules/api"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TfInheritConfig {
	/// The file holding the module blocks, relative to the project root.
	#[serde(default = "default_main_file")]
	pub main_file: PathBuf,
	/// The generated variables file, relative to the project root.
	#[serde(default = "default_inherited_file")]
	pub inherited_file: PathBuf,
	/// Files of a module folder whose name starts with this prefix (and ends
	/// with `.tf`) are read as variable files.
	#[serde(default = "default_variable_file_prefix")]
	pub variable_file_prefix: String,
	/// Module name to local folder, relative to the project root. Takes
	/// precedence over the module's `source`, which is how modules with a
	/// registry or git source are read from wherever they were downloaded.
	#[serde(default)]
	pub sources: BTreeMap<String, PathBuf>,
}

impl Default for TfInheritConfig {
	fn default() -> Self {
		Self {
			main_file: default_main_file(),
			inherited_file: default_inherited_file(),
			variable_file_prefix: default_variable_file_prefix(),
			sources: BTreeMap::new(),
		}
	}
}

fn default_main_file() -> PathBuf {
	PathBuf::from(DEFAULT_MAIN_FILE)
}

fn default_inherited_file() -> PathBuf {
	PathBuf::from(DEFAULT_INHERITED_FILE)
}

fn default_variable_file_prefix() -> String {
	DEFAULT_VARIABLE_FILE_PREFIX.to_string()
}

impl TfInheritConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> InheritResult<Option<TfInheritConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: TfInheritConfig =
			toml::from_str(&content).map_err(|e| InheritError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}
}
