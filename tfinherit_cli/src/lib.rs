use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep Terraform module call sites in sync with the variables their modules declare.",
	long_about = "tfinherit reads the module blocks of a main file (main.tf) and the variable \
	              files of every module they call, then regenerates two files:\n\n  main.tf       \
	              aligned `name = var.name` assignments inside each module block\n  \
	              variables-inherited.tf  the module variables declared at the call site\n\nValues \
	              set by hand and declarations marked `# override` survive regeneration.\n\nQuick \
	              start:\n  tfinherit update  Regenerate both files\n  tfinherit check   Verify \
	              both files are up to date\n  tfinherit list    Show modules and their variable \
	              files"
)]
pub struct TfInheritCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// The file holding the module blocks, relative to the project root.
	/// Overrides `main_file` from `tfinherit.toml`.
	#[arg(long, global = true)]
	pub main_file: Option<PathBuf>,

	/// The generated variables file, relative to the project root.
	/// Overrides `inherited_file` from `tfinherit.toml`.
	#[arg(long, global = true)]
	pub inherited_file: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Check that the main file and the inherited variables file are up to
	/// date.
	///
	/// Compares both files against what `update` would write. Exits with a
	/// non-zero status code if either is stale, which makes it a good fit
	/// for CI pipelines. Use `--diff` to see exactly what would change.
	Check {
		/// Show a unified diff for each stale file.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Regenerate the main file and the inherited variables file.
	///
	/// Use `--dry-run` to preview changes without writing to disk, or
	/// `--watch` to automatically re-run whenever a file changes.
	Update {
		/// Preview changes without writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch for file changes and re-run updates automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// List the modules of the main file with their sources and variable
	/// files.
	List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each stale entry includes
	/// the file path, current content, and expected content.
	Json,
}
