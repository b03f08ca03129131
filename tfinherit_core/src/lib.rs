//! `tfinherit_core` keeps Terraform module call sites in sync with the
//! variables their modules declare. It reads a main file (`main.tf`) holding
//! `module` blocks, reads the variable files of every module source, and
//! regenerates two files:
//!
//! - the main file, with one aligned `name = var.name` assignment per module
//!   variable inside each module block, keeping hand-set and commented values;
//! - `variables-inherited.tf`, declaring the module variables at the call
//!   site, keeping declarations marked `# override`.
//!
//! Generation is idempotent: running it on its own output changes nothing.
//!
//! ## Processing Pipeline
//!
//! ```text
//! main.tf / variables*.tf
//!   → Reader (streams lines to a visitor with look-behind on kept lines)
//!   → Parser (state machine extracting module and variable blocks into a Content)
//!   → Module resolution (finds each module's folder and variable files)
//!   → Generator (replays kept lines, injects assignments, renders declarations)
//!   → Engine (compares with disk, writes changed files)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `tfinherit.toml`.
//! - [`module_source`]: Resolving module sources to local folders and
//!   listing their variable files.
//! - [`reader`]: Line streaming with look-behind.
//! - [`syntax`]: Markers and keywords shared by the parser and generator.
//!
//! ## Key Types
//!
//! - [`Content`]: The parsed form of a file.
//! - [`ModuleBlock`]: A module call site with the variables it sets.
//! - [`VariableBlock`]: A variable declaration.
//! - [`Project`]: Every parsed file of one generation.
//! - [`UpdateResult`]: The generated files next to their current content.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use tfinherit_core::check_project;
//! use tfinherit_core::compute_updates;
//! use tfinherit_core::scan_project_with_config;
//! use tfinherit_core::write_updates;
//!
//! let project = scan_project_with_config(Path::new(".")).unwrap();
//!
//! let result = check_project(&project);
//! if !result.is_ok() {
//!     eprintln!("{} stale file(s) found", result.stale.len());
//! }
//!
//! let updates = compute_updates(&project);
//! write_updates(&updates).unwrap();
//! ```

pub use attribute::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use model::*;
pub use parser::*;

mod attribute;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod generator;
mod model;
pub mod module_source;
mod parser;
pub mod reader;
pub mod syntax;

#[cfg(test)]
mod __fixtures;
