use std::{
	ffi::{CStr, CString},
	os::raw::{c_char, c_int},
	path::{Path, PathBuf},
};

use thiserror::Error;

/// Precision libsass falls back to when the front-end does not override it.
pub const DEFAULT_PRECISION: u32 = 5;

/// Output style for the generated CSS. Maps 1:1 onto `Sass_Output_Style`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputStyle {
	#[default]
	Nested,
	Expanded,
	Compact,
	Compressed,
}

impl OutputStyle {
	fn to_sass(self) -> sass_sys::Sass_Output_Style {
		match self {
			OutputStyle::Nested => sass_sys::Sass_Output_Style::SASS_STYLE_NESTED,
			OutputStyle::Expanded => sass_sys::Sass_Output_Style::SASS_STYLE_EXPANDED,
			OutputStyle::Compact => sass_sys::Sass_Output_Style::SASS_STYLE_COMPACT,
			OutputStyle::Compressed => sass_sys::Sass_Output_Style::SASS_STYLE_COMPRESSED,
		}
	}
}

/// How source locations surface in the output: not at all, as `/* line N */`
/// comments, or as a source map written to `map_file`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Comments {
	#[default]
	None,
	LineNumbers,
	SourceMap { map_file: PathBuf },
}

/// Options handed to the compiler for a single invocation.
#[derive(Clone, Debug)]
pub struct Options {
	pub style: OutputStyle,
	pub comments: Comments,
	/// Search path for `@import`. libsass also honors `:`-separated lists.
	pub include_path: Option<PathBuf>,
	pub precision: u32,
	/// Where the caller intends to write the CSS. libsass derives the
	/// `sourceMappingURL` comment from it.
	pub output_path: Option<PathBuf>,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			style: OutputStyle::Nested,
			comments: Comments::None,
			include_path: None,
			precision: DEFAULT_PRECISION,
			output_path: None,
		}
	}
}

/// What a successful compilation returns.
#[derive(Clone, Debug)]
pub struct Output {
	pub css: String,
	pub source_map: Option<String>,
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("{}", .message.as_deref().unwrap_or("the compiler reported an error without a message"))]
	Compile { status: i32, message: Option<String> },
	#[error("the compiler returned neither an error nor an output (status {status})")]
	MissingOutput { status: i32 },
	#[error("{what} contains a NUL byte and cannot be passed to the compiler")]
	InvalidInput { what: &'static str },
}

/// Compile an in-memory stylesheet through a libsass data context.
pub fn compile_string(source: &str, options: &Options) -> Result<Output, Error> {
	let ctx = DataContext::new(source)?;
	apply_options(options, ctx.options())?;
	ctx.compile();
	collect(ctx.context())
}

/// Compile a stylesheet file through a libsass file context.
pub fn compile_file(path: &Path, options: &Options) -> Result<Output, Error> {
	let ctx = FileContext::new(path)?;
	apply_options(options, ctx.options())?;
	ctx.compile();
	collect(ctx.context())
}

/// Version string of the libsass build linked into this binary.
pub fn libsass_version() -> String {
	read_string(unsafe { sass_sys::libsass_version() }).unwrap_or_else(|| "unknown".to_string())
}

struct DataContext(*mut sass_sys::Sass_Data_Context);

impl DataContext {
	fn new(source: &str) -> Result<Self, Error> {
		// the context takes ownership of the buffer and frees it on delete,
		// so it must come from the libsass allocator
		let buffer = sass_owned_string(source, "the source")?;
		Ok(Self(unsafe { sass_sys::sass_make_data_context(buffer) }))
	}

	fn context(&self) -> *mut sass_sys::Sass_Context {
		unsafe { sass_sys::sass_data_context_get_context(self.0) }
	}

	fn options(&self) -> *mut sass_sys::Sass_Options {
		unsafe { sass_sys::sass_data_context_get_options(self.0) }
	}

	fn compile(&self) {
		unsafe { sass_sys::sass_compile_data_context(self.0) };
	}
}

impl Drop for DataContext {
	fn drop(&mut self) {
		unsafe { sass_sys::sass_delete_data_context(self.0) };
	}
}

struct FileContext(*mut sass_sys::Sass_File_Context);

impl FileContext {
	fn new(path: &Path) -> Result<Self, Error> {
		let path = c_path(path, "the input path")?;
		Ok(Self(unsafe { sass_sys::sass_make_file_context(path.as_ptr()) }))
	}

	fn context(&self) -> *mut sass_sys::Sass_Context {
		unsafe { sass_sys::sass_file_context_get_context(self.0) }
	}

	fn options(&self) -> *mut sass_sys::Sass_Options {
		unsafe { sass_sys::sass_file_context_get_options(self.0) }
	}

	fn compile(&self) {
		unsafe { sass_sys::sass_compile_file_context(self.0) };
	}
}

impl Drop for FileContext {
	fn drop(&mut self) {
		unsafe { sass_sys::sass_delete_file_context(self.0) };
	}
}

fn apply_options(options: &Options, target: *mut sass_sys::Sass_Options) -> Result<(), Error> {
	unsafe {
		sass_sys::sass_option_set_output_style(target, options.style.to_sass());
		sass_sys::sass_option_set_precision(target, options.precision as c_int);
	}
	match &options.comments {
		Comments::None => {}
		Comments::LineNumbers => unsafe {
			sass_sys::sass_option_set_source_comments(target, true);
		},
		Comments::SourceMap { map_file } => {
			// option setters copy their argument, the CString only has to
			// outlive the call
			let map_file = c_path(map_file, "the source map path")?;
			unsafe { sass_sys::sass_option_set_source_map_file(target, map_file.as_ptr()) };
		}
	}
	if let Some(path) = &options.include_path {
		let path = c_path(path, "the include path")?;
		unsafe { sass_sys::sass_option_set_include_path(target, path.as_ptr()) };
	}
	if let Some(path) = &options.output_path {
		let path = c_path(path, "the output path")?;
		unsafe { sass_sys::sass_option_set_output_path(target, path.as_ptr()) };
	}
	Ok(())
}

fn collect(ctx: *mut sass_sys::Sass_Context) -> Result<Output, Error> {
	let status = unsafe { sass_sys::sass_context_get_error_status(ctx) };
	if status != 0 {
		let message = read_string(unsafe { sass_sys::sass_context_get_error_message(ctx) });
		return Err(Error::Compile { status, message });
	}
	let Some(css) = read_string(unsafe { sass_sys::sass_context_get_output_string(ctx) }) else {
		return Err(Error::MissingOutput { status });
	};
	let source_map = read_string(unsafe { sass_sys::sass_context_get_source_map_string(ctx) });
	Ok(Output { css, source_map })
}

fn read_string(ptr: *const c_char) -> Option<String> {
	if ptr.is_null() {
		return None;
	}
	Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

fn sass_owned_string(value: &str, what: &'static str) -> Result<*mut c_char, Error> {
	let value = CString::new(value).map_err(|_| Error::InvalidInput { what })?;
	Ok(unsafe { sass_sys::sass_copy_c_string(value.as_ptr()) })
}

fn c_path(path: &Path, what: &'static str) -> Result<CString, Error> {
	CString::new(path.to_string_lossy().into_owned()).map_err(|_| Error::InvalidInput { what })
}

#[cfg(test)]
mod tests;
