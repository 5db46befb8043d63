use std::{
	fmt, fs,
	io::{self, Read},
	path::{Path, PathBuf},
};

use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use rsassc::{Comments, DEFAULT_PRECISION, Options, Output, OutputStyle};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(
	name = "rsassc",
	version,
	long_version = long_version(),
	about = "Compile Sass/SCSS stylesheets with libsass"
)]
pub struct Cli {
	/// Read input from standard input instead of an input file
	#[arg(short = 's', long)]
	pub stdin: bool,
	/// Output style
	#[arg(short = 't', long = "style", value_enum, value_name = "NAME", default_value = "nested")]
	pub style: StyleArg,
	/// Emit comments showing original line numbers
	#[arg(short = 'l', long = "line-numbers", visible_alias = "line-comments")]
	pub line_numbers: bool,
	/// Set Sass import path
	#[arg(short = 'I', long = "load-path", value_name = "PATH")]
	pub load_path: Option<PathBuf>,
	/// Emit source map
	#[arg(short = 'm', long)]
	pub sourcemap: bool,
	/// Set the precision for numbers
	#[arg(
		long,
		value_name = "N",
		default_value_t = DEFAULT_PRECISION,
		value_parser = parse_precision,
		allow_hyphen_values = true
	)]
	pub precision: u32,
	/// Input file (`-` reads standard input)
	#[arg(value_name = "INPUT")]
	pub input: Option<PathBuf>,
	/// Output file (standard output when omitted)
	#[arg(value_name = "OUTPUT")]
	pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
	Nested,
	Expanded,
	Compact,
	Compressed,
}

impl From<StyleArg> for OutputStyle {
	fn from(style: StyleArg) -> Self {
		match style {
			StyleArg::Nested => OutputStyle::Nested,
			StyleArg::Expanded => OutputStyle::Expanded,
			StyleArg::Compact => OutputStyle::Compact,
			StyleArg::Compressed => OutputStyle::Compressed,
		}
	}
}

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Compile(#[from] rsassc::Error),
	#[error("error reading standard input: {0}")]
	StdinRead(#[source] io::Error),
	#[error("error writing {}: {}", .path.display(), .source)]
	WriteOutput {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("the compiler did not produce a source map")]
	MissingSourceMap,
}

impl Error {
	/// 1 for compiler and output-file failures, 2 for everything that never
	/// reached a result (stdin failures, missing compiler output).
	pub fn exit_code(&self) -> u8 {
		match self {
			Error::Compile(rsassc::Error::Compile { .. }) | Error::WriteOutput { .. } => 1,
			Error::Compile(_) | Error::StdinRead(_) | Error::MissingSourceMap => 2,
		}
	}
}

pub fn run(cli: &Cli) -> Result<(), Error> {
	let (source, output) = resolve_streams(cli);
	let options = build_options(cli, output);

	let compiled = match source {
		Source::Stdin => {
			let mut buffer = String::new();
			io::stdin().read_to_string(&mut buffer).map_err(Error::StdinRead)?;
			rsassc::compile_string(&buffer, &options)?
		}
		Source::File(path) => rsassc::compile_file(path, &options)?,
	};

	emit(&compiled, output, cli.sourcemap)
}

pub fn report_error(err: &Error) {
	log_error(err.to_string().trim_end());
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source<'a> {
	Stdin,
	File(&'a Path),
}

fn resolve_streams(cli: &Cli) -> (Source<'_>, Option<&Path>) {
	if cli.stdin {
		// with --stdin the first positional names the output file
		return (Source::Stdin, cli.input.as_deref().or(cli.output.as_deref()));
	}
	match cli.input.as_deref() {
		Some(path) if path.as_os_str() != "-" => (Source::File(path), cli.output.as_deref()),
		_ => (Source::Stdin, cli.output.as_deref()),
	}
}

fn build_options(cli: &Cli, output: Option<&Path>) -> Options {
	let comments = if cli.sourcemap {
		match output {
			Some(path) => Comments::SourceMap {
				map_file: map_path(path),
			},
			None => {
				log_warn("--sourcemap needs an output file, ignoring");
				Comments::None
			}
		}
	} else if cli.line_numbers {
		Comments::LineNumbers
	} else {
		Comments::None
	};

	Options {
		style: cli.style.into(),
		comments,
		include_path: cli.load_path.clone(),
		precision: cli.precision,
		output_path: output.map(Path::to_path_buf),
	}
}

fn parse_precision(raw: &str) -> Result<u32, String> {
	let value: i64 = raw
		.trim()
		.parse()
		.map_err(|_| format!("`{raw}` is not an integer"))?;
	if value < 0 {
		return Ok(DEFAULT_PRECISION);
	}
	Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

fn map_path(output: &Path) -> PathBuf {
	let mut path = output.as_os_str().to_os_string();
	path.push(".map");
	PathBuf::from(path)
}

fn emit(compiled: &Output, output: Option<&Path>, sourcemap: bool) -> Result<(), Error> {
	match output {
		Some(path) => write_file(path, &compiled.css)?,
		// the raw compiler output is the only thing allowed on stdout
		None => print!("{}", compiled.css),
	}

	if sourcemap {
		if let Some(path) = output {
			match &compiled.source_map {
				Some(map) => write_file(&map_path(path), map)?,
				None => return Err(Error::MissingSourceMap),
			}
		}
	}

	Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
	fs::write(path, contents).map_err(|source| Error::WriteOutput {
		path: path.to_path_buf(),
		source,
	})
}

fn long_version() -> String {
	format!("{}\nlibsass: {}", env!("CARGO_PKG_VERSION"), rsassc::libsass_version())
}

fn log_warn(message: impl fmt::Display) {
	log_message(LogKind::Warning, message);
}

fn log_error(message: impl fmt::Display) {
	log_message(LogKind::Error, message);
}

fn log_message(kind: LogKind, message: impl fmt::Display) {
	let tag = "[rsassc]".bold().cyan().to_string();
	eprintln!("{} {} {}", tag, kind.style_icon(), kind.style_text(message.to_string()));
}

#[derive(Clone, Copy)]
enum LogKind {
	Warning,
	Error,
}

impl LogKind {
	fn style_icon(self) -> String {
		match self {
			LogKind::Warning => "⚠".magenta().to_string(),
			LogKind::Error => "✖".bright_red().to_string(),
		}
	}

	fn style_text(self, text: String) -> String {
		match self {
			LogKind::Warning => text.magenta().to_string(),
			LogKind::Error => text.bright_red().to_string(),
		}
	}
}
