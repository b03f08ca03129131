use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::ErrorKind;
use std::path::Path;

use crate::InheritError;
use crate::InheritResult;
use crate::Line;

/// Stream `reader` line by line and collect the lines the visitor keeps.
///
/// Each physical line is passed to `visit` with trailing whitespace (and any
/// `\r` of a CRLF ending) removed, together with the lines retained so far.
/// The last retained line is the look-behind the visitor may annotate. When
/// `visit` returns `true` the line is appended to the retained sequence.
pub fn scan_lines<R, F>(reader: R, mut visit: F) -> std::io::Result<Vec<Line>>
where
	R: BufRead,
	F: FnMut(&str, &mut Vec<Line>) -> bool,
{
	let mut retained = Vec::new();

	for line in reader.lines() {
		accept(&line?, &mut visit, &mut retained);
	}

	Ok(retained)
}

/// Like [`scan_lines`] over text already in memory.
pub fn scan_str<F>(text: &str, mut visit: F) -> Vec<Line>
where
	F: FnMut(&str, &mut Vec<Line>) -> bool,
{
	let mut retained = Vec::new();

	for line in text.lines() {
		accept(line, &mut visit, &mut retained);
	}

	retained
}

fn accept<F>(line: &str, visit: &mut F, retained: &mut Vec<Line>)
where
	F: FnMut(&str, &mut Vec<Line>) -> bool,
{
	let line = line.trim_end();

	if visit(line, retained) {
		retained.push(Line::new(line));
	}
}

/// Like [`scan_lines`], reading from the file at `path`.
///
/// A missing file is reported as [`InheritError::FileNotFound`] so callers
/// can tell "nothing there yet" apart from other I/O failures.
pub fn scan_file<F>(path: &Path, visit: F) -> InheritResult<Vec<Line>>
where
	F: FnMut(&str, &mut Vec<Line>) -> bool,
{
	let file = File::open(path).map_err(|error| not_found_or_io(error, path))?;
	scan_lines(BufReader::new(file), visit).map_err(|error| not_found_or_io(error, path))
}

/// Read the whole file at `path`, with the same error mapping as
/// [`scan_file`].
pub fn read_file(path: &Path) -> InheritResult<String> {
	std::fs::read_to_string(path).map_err(|error| not_found_or_io(error, path))
}

pub(crate) fn not_found_or_io(error: std::io::Error, path: &Path) -> InheritError {
	if error.kind() == ErrorKind::NotFound {
		InheritError::FileNotFound {
			path: path.to_path_buf(),
		}
	} else {
		InheritError::Io(error)
	}
}
