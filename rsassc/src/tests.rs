use std::{fs, path::PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use super::{
	Comments, DEFAULT_PRECISION, Error, Options, OutputStyle, compile_file, compile_string,
	libsass_version,
};

fn write_stylesheet(dir: &TempDir, name: &str, contents: &str) -> Result<PathBuf> {
	let path = dir.path().join(name);
	fs::write(&path, contents)?;
	Ok(path)
}

#[test]
fn default_options_match_front_end_defaults() {
	let options = Options::default();
	assert_eq!(options.style, OutputStyle::Nested);
	assert_eq!(options.comments, Comments::None);
	assert_eq!(options.include_path, None);
	assert_eq!(options.precision, DEFAULT_PRECISION);
}

#[test]
fn compile_string_expands_nested_rules() {
	let output = compile_string(".a { .b { color: red; } }", &Options::default()).unwrap();
	assert!(output.css.contains(".a .b"));
	assert!(output.css.contains("color: red"));
	assert!(output.source_map.is_none());
}

#[test]
fn compressed_style_strips_whitespace() {
	let options = Options {
		style: OutputStyle::Compressed,
		..Options::default()
	};
	let output = compile_string("a { color: red; }", &options).unwrap();
	assert!(output.css.contains("a{color:red}"));
}

#[test]
fn precision_limits_emitted_decimals() {
	let options = Options {
		precision: 2,
		..Options::default()
	};
	let output = compile_string("a { width: (1px / 3); }", &options).unwrap();
	assert!(output.css.contains("0.33px"), "got: {}", output.css);
	assert!(!output.css.contains("0.333"));
}

#[test]
fn line_numbers_emit_source_comments() {
	let options = Options {
		comments: Comments::LineNumbers,
		..Options::default()
	};
	let output = compile_string("a { color: red; }", &options).unwrap();
	assert!(output.css.contains("/* line 1"), "got: {}", output.css);
}

#[test]
fn source_map_is_returned_when_a_map_file_is_set() {
	let options = Options {
		comments: Comments::SourceMap {
			map_file: PathBuf::from("out.css.map"),
		},
		output_path: Some(PathBuf::from("out.css")),
		..Options::default()
	};
	let output = compile_string("a { color: red; }", &options).unwrap();
	let map = output.source_map.expect("map requested but not returned");
	assert!(map.contains("\"version\""));
	assert!(output.css.contains("sourceMappingURL=out.css.map"));
}

#[test]
fn compile_string_reports_syntax_errors() {
	let err = compile_string("a { color: ", &Options::default()).unwrap_err();
	match err {
		Error::Compile { status, message } => {
			assert_ne!(status, 0);
			assert!(message.expect("libsass formats a message").contains("Error"));
		}
		other => panic!("expected a compile error, got {other:?}"),
	}
}

#[test]
fn compile_string_rejects_interior_nul() {
	let err = compile_string("a { color: red; }\0", &Options::default()).unwrap_err();
	assert!(matches!(err, Error::InvalidInput { .. }));
}

#[test]
fn compile_file_resolves_imports_from_the_include_path() {
	let dir = TempDir::new().unwrap();
	write_stylesheet(&dir, "_palette.scss", "$accent: teal;").unwrap();
	let entry = write_stylesheet(&dir, "entry.scss", "@import \"palette\";\na { color: $accent; }")
		.unwrap();

	let options = Options {
		include_path: Some(dir.path().to_path_buf()),
		..Options::default()
	};
	let output = compile_file(&entry, &options).unwrap();
	assert!(output.css.contains("color: teal"));
}

#[test]
fn compile_file_reports_missing_input() {
	let err = compile_file(std::path::Path::new("no/such/sheet.scss"), &Options::default())
		.unwrap_err();
	assert!(matches!(err, Error::Compile { .. }));
}

#[test]
fn libsass_version_is_populated() {
	assert!(!libsass_version().is_empty());
}
