use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tfinherit_cli::Commands;
use tfinherit_cli::OutputFormat;
use tfinherit_cli::TfInheritCli;
use tfinherit_core::InheritError;
use tfinherit_core::Project;
use tfinherit_core::ProjectOptions;
use tfinherit_core::check_project;
use tfinherit_core::compute_updates;
use tfinherit_core::config::TfInheritConfig;
use tfinherit_core::scan_project;
use tfinherit_core::write_updates;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "TFINHERIT_LOG";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TfInheritCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Check { diff, format }) => run_check(&args, diff, format),
		Some(Commands::Update { dry_run, watch }) => run_update(&args, dry_run, watch),
		Some(Commands::List) => run_list(&args),
		None => {
			eprintln!("No subcommand specified. Run `tfinherit --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<InheritError>() {
			Ok(inherit_err) => {
				let report: miette::Report = (*inherit_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr, filtered by `TFINHERIT_LOG` when set.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn resolve_root(args: &TfInheritCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Discovered config with command line overrides applied.
fn project_options(args: &TfInheritCli) -> Result<ProjectOptions, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = TfInheritConfig::load(&root)?;
	let mut options = ProjectOptions::from_config(root, config.as_ref());

	if let Some(main_file) = &args.main_file {
		options.main_file.clone_from(main_file);
	}

	if let Some(inherited_file) = &args.inherited_file {
		options.inherited_file.clone_from(inherited_file);
	}

	tracing::debug!(
		root = %options.root.display(),
		main_file = %options.main_file.display(),
		inherited_file = %options.inherited_file.display(),
		config = config.is_some(),
		"resolved project options"
	);

	Ok(options)
}

fn scan(args: &TfInheritCli) -> Result<Project, Box<dyn std::error::Error>> {
	let options = project_options(args)?;
	let project = scan_project(&options, &options.resolver())?;

	Ok(project)
}

fn run_check(
	args: &TfInheritCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let project = scan(args)?;
	let root = resolve_root(args);
	let result = check_project(&project);

	if result.is_ok() {
		match format {
			OutputFormat::Json => {
				println!("{{\"ok\":true,\"stale\":[]}}");
			}
			OutputFormat::Text => {
				println!("Check passed: all files are up to date.");
			}
		}
		return Ok(());
	}

	match format {
		OutputFormat::Json => {
			let stale_entries: Vec<serde_json::Value> = result
				.stale
				.iter()
				.map(|file| {
					serde_json::json!({
						"file": make_relative(&file.path, &root),
						"exists": file.current.is_some(),
						"current": file.current,
						"expected": file.content,
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": false,
				"stale": stale_entries,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			eprintln!("Check failed.");
			eprintln!();
			eprintln!("Stale files:");

			for file in &result.stale {
				let rel = make_relative(&file.path, &root);

				if file.current.is_some() {
					eprintln!("  {rel}");
				} else {
					eprintln!("  {rel} (missing)");
				}

				if show_diff {
					print_diff(file.current.as_deref().unwrap_or_default(), &file.content);
				}
			}

			eprintln!();
			eprintln!(
				"{}",
				colored!(
					format!(
						"{} file(s) are out of date. Run `tfinherit update` to regenerate them.",
						result.stale.len()
					),
					red
				)
			);
		}
	}

	process::exit(1);
}

fn run_update(
	args: &TfInheritCli,
	dry_run: bool,
	watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	// Run the initial update.
	run_update_once(args, dry_run)?;

	if !watch || dry_run {
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) && event.paths.iter().any(|path| is_terraform_file(path))
				{
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, updating...");
		if let Err(e) = run_update_once(args, false) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn run_update_once(args: &TfInheritCli, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let project = scan(args)?;
	let root = resolve_root(args);
	let updates = compute_updates(&project);

	if updates.is_up_to_date() {
		println!("All files are already up to date.");
		return Ok(());
	}

	if dry_run {
		println!(
			"Dry run: would write {} file(s):",
			updates.changed().count()
		);

		for file in updates.changed() {
			println!("  {}", make_relative(&file.path, &root));

			if args.verbose {
				print_diff(file.current.as_deref().unwrap_or_default(), &file.content);
			}
		}

		return Ok(());
	}

	write_updates(&updates)?;

	for file in updates.changed() {
		let verb = if file.path == project.inherited_path {
			"Generated"
		} else {
			"Updated"
		};
		println!("{verb} {}", make_relative(&file.path, &root));
	}

	Ok(())
}

fn run_list(args: &TfInheritCli) -> Result<(), Box<dyn std::error::Error>> {
	let project = scan(args)?;
	let root = resolve_root(args);
	let mut file_count = 0;

	println!("{}", colored!("Modules:", bold));

	for module in project.main.blocks.modules.values() {
		let folder = project
			.folders
			.get(&module.name)
			.and_then(Option::as_ref)
			.map_or_else(
				|| colored!("not available locally", yellow),
				|folder| make_relative(folder, &root),
			);
		println!("  {} \"{}\" -> {folder}", module.name, module.source);

		for file in project.files.get(&module.name).into_iter().flatten() {
			file_count += 1;
			println!(
				"    {} ({} variable(s))",
				file.file_name,
				file.content.blocks.variables.len()
			);
		}

		println!("    {} value(s) set in the module block", module.variables.len());
	}

	println!(
		"\n{} module(s), {file_count} variable file(s)",
		project.main.blocks.modules.len()
	);

	Ok(())
}

fn is_terraform_file(path: &Path) -> bool {
	path.extension().is_some_and(|extension| extension == "tf")
		|| path
			.file_name()
			.is_some_and(|name| name.to_string_lossy().ends_with("tfinherit.toml"))
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
