use std::collections::HashSet;

use crate::Block;
use crate::Content;
use crate::ModuleBlock;
use crate::ModuleVariableFiles;
use crate::VariableAttribute;
use crate::VariableBlock;
use crate::VariableFile;
use crate::syntax::ATTRIBUTE_INDENT;
use crate::syntax::COMMENT_PREFIX;
use crate::syntax::FILE_EXTENSION;
use crate::syntax::GENERATED_DELIMITER_PREFIX;
use crate::syntax::OVERRIDE_DECORATOR;
use crate::syntax::pass_through;

/// Rewrite the main file.
///
/// Every retained line is replayed. After the last line of each module block
/// the module's variable assignments are injected, one group per variable
/// file.
pub fn generate_main_file(main: &Content, files: &ModuleVariableFiles) -> String {
	let mut output = LineWriter::default();

	for line in &main.lines {
		output.push(&line.value);

		let Some(closed) = &line.closes else {
			continue;
		};

		match main.blocks.get(closed.kind, &closed.name) {
			Some(Block::Module(module)) => {
				let module_files = files.get(&module.name).map_or(&[][..], Vec::as_slice);
				write_module_assignments(&mut output, module, module_files);
			}
			Some(Block::Variable(_)) | None => {}
		}
	}

	output.finish()
}

/// Render the inherited variables file.
///
/// `inherited` is the previous version of the file, if any. Its blocks marked
/// with the override decorator replace the module's own declarations.
pub fn generate_inherited_file(
	main: &Content,
	inherited: Option<&Content>,
	files: &ModuleVariableFiles,
) -> String {
	let mut output = LineWriter::default();
	let mut declared: HashSet<&str> = main.blocks.variables.keys().map(String::as_str).collect();

	for module in main.blocks.modules.values() {
		let Some(module_files) = files.get(&module.name) else {
			continue;
		};

		for file in module_files {
			let variables: Vec<&VariableBlock> = file
				.content
				.blocks
				.variables
				.values()
				.filter(|variable| is_inherited(main, module, &variable.name))
				.filter(|variable| declared.insert(variable.name.as_str()))
				.collect();

			if variables.is_empty() {
				continue;
			}

			if !output.is_empty() {
				output.blank();
			}

			output.push(&format!(
				"{GENERATED_DELIMITER_PREFIX} MODULE {} FILE {}",
				module.name,
				source_file_path(&module.source, &file.file_name)
			));

			for (index, variable) in variables.into_iter().enumerate() {
				if index > 0 {
					output.blank();
				}

				let overridden = inherited
					.and_then(|content| content.blocks.variables.get(&variable.name))
					.filter(|block| block.is_override);

				match overridden {
					Some(block) => {
						output.push(OVERRIDE_DECORATOR);
						write_variable_block(&mut output, block);
					}
					None => write_variable_block(&mut output, variable),
				}
			}
		}
	}

	output.finish()
}

/// Whether a variable of `module` must be declared in the inherited file.
///
/// It must when something in the main file references it, or when the module
/// block passes it through (the block sets nothing for it, not even as a
/// reserved attribute).
pub fn is_inherited(main: &Content, module: &ModuleBlock, name: &str) -> bool {
	main.variable_names.contains(name)
		|| !(module.variables.contains_key(name) || module.reserved_attributes.contains(name))
}

/// The label of the group generated for a variable file: the part of the
/// file name after its first separator, without the extension.
///
/// `variables-deployment.tf` is labelled `deployment`; `variables.tf` has no
/// label.
pub fn group_label(file_name: &str) -> Option<&str> {
	let stem = file_name.strip_suffix(FILE_EXTENSION).unwrap_or(file_name);
	let (_, label) = stem.split_once(['-', '_'])?;

	(!label.is_empty()).then_some(label)
}

/// `source` relative path of a module file, as shown in group headers.
fn source_file_path(source: &str, file_name: &str) -> String {
	let mut source = source.trim_end_matches('/');

	while let Some(rest) = source.strip_prefix("./") {
		source = rest;
	}

	if source.is_empty() || source == "." {
		file_name.to_string()
	} else {
		format!("{source}/{file_name}")
	}
}

fn write_module_assignments(output: &mut LineWriter, module: &ModuleBlock, files: &[VariableFile]) {
	let mut emitted: HashSet<&str> = HashSet::new();

	for file in files {
		let assignments = file
			.content
			.blocks
			.variables
			.keys()
			.filter(|name| !module.reserved_attributes.contains(name.as_str()))
			.filter(|name| emitted.insert(name.as_str()))
			.map(|name| Assignment::new(name, module.variables.get(name)))
			.collect();

		write_group(output, group_label(&file.file_name), assignments);
	}

	// Hand-set values of variables no file declares are kept.
	let leftovers = module
		.variables
		.iter()
		.filter(|(name, attribute)| attribute.is_custom && !emitted.contains(name.as_str()))
		.map(|(name, attribute)| Assignment::new(name, Some(attribute)))
		.collect();

	write_group(output, None, leftovers);

	tracing::trace!(module = %module.name, files = files.len(), "injected assignments");
}

fn write_group(output: &mut LineWriter, label: Option<&str>, mut assignments: Vec<Assignment<'_>>) {
	if assignments.is_empty() {
		return;
	}

	assignments.sort_by_key(Assignment::rank);

	output.blank();

	if let Some(label) = label {
		output.push(&format!(
			"{ATTRIBUTE_INDENT}{GENERATED_DELIMITER_PREFIX} {label}"
		));
	}

	let widest = |is_commented: bool| {
		assignments
			.iter()
			.filter(|assignment| assignment.is_commented == is_commented)
			.map(|assignment| assignment.display_name().chars().count())
			.max()
			.unwrap_or(0)
	};
	let plain_width = widest(false);
	let commented_width = widest(true);

	let last = assignments.len() - 1;

	for (index, assignment) in assignments.iter().enumerate() {
		let name = assignment.display_name();

		if let Some((first, continuation)) = assignment
			.lines
			.split_first()
			.filter(|(_, continuation)| !continuation.is_empty())
		{
			output.push(&format!("{ATTRIBUTE_INDENT}{name} = {first}"));

			for line in continuation {
				output.push(line);
			}

			if index < last {
				output.blank();
			}

			continue;
		}

		let width = if assignment.is_commented {
			commented_width
		} else {
			plain_width
		};
		let value = assignment
			.lines
			.first()
			.cloned()
			.unwrap_or_else(|| pass_through(assignment.name));

		output.push(&format!("{ATTRIBUTE_INDENT}{name:<width$} = {value}"));
	}
}

fn write_variable_block(output: &mut LineWriter, block: &VariableBlock) {
	if block.lines.is_empty() {
		output.push(&format!("variable \"{}\" {{}}", block.name));
		return;
	}

	output.push(&format!("variable \"{}\" {{", block.name));

	for line in &block.lines {
		output.push(line);
	}

	output.push("}");
}

/// One `name = value` line (or lines) of a generated group.
#[derive(Debug)]
struct Assignment<'a> {
	name: &'a str,
	is_commented: bool,
	/// Recorded value; empty for a pass-through.
	lines: &'a [String],
}

impl<'a> Assignment<'a> {
	fn new(name: &'a str, attribute: Option<&'a VariableAttribute>) -> Self {
		Self {
			name,
			is_commented: attribute.is_some_and(|attribute| attribute.is_commented),
			lines: attribute.map_or(&[][..], |attribute| attribute.lines.as_slice()),
		}
	}

	/// Customized values first, then pass-through, then commented.
	fn rank(&self) -> u8 {
		match (self.is_commented, self.lines.is_empty()) {
			(false, false) => 0,
			(false, true) => 1,
			(true, _) => 2,
		}
	}

	fn display_name(&self) -> String {
		if self.is_commented {
			format!("{COMMENT_PREFIX} {}", self.name)
		} else {
			self.name.to_string()
		}
	}
}

/// Newline terminated output that never ends lines with whitespace and never
/// stacks blank lines.
#[derive(Debug, Default)]
struct LineWriter {
	buffer: String,
	last_is_blank: bool,
}

impl LineWriter {
	fn push(&mut self, line: &str) {
		let line = line.trim_end();
		self.buffer.push_str(line);
		self.buffer.push('\n');
		self.last_is_blank = line.is_empty();
	}

	fn blank(&mut self) {
		if !self.last_is_blank {
			self.push("");
		}
	}

	fn is_empty(&self) -> bool {
		self.buffer.is_empty()
	}

	fn finish(self) -> String {
		self.buffer
	}
}
