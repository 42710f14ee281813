//! Execution context of a swath run.

use crate::{extension::Extensions, scratch::Scratch, SwathError};
use grid::GridFormat;
use log::info;
use std::{
    cell::RefCell,
    path::{Path, PathBuf},
};

/// Everything a run reads or writes besides its parameters.
pub struct Context {
    /// Directory receiving final outputs.
    workspace: PathBuf,

    /// Replace existing outputs (defaults to true).
    overwrite: bool,

    /// Format of the output raster (defaults to ASCII grid).
    format: GridFormat,

    /// Intermediate results, purged at the end of every run.
    scratch: Scratch,

    extensions: Extensions,

    /// Progress messages, in order.
    messages: RefCell<Vec<String>>,
}

impl Context {
    pub fn new<P: Into<PathBuf>>(workspace: P) -> Self {
        Self {
            workspace: workspace.into(),
            overwrite: true,
            format: GridFormat::Ascii,
            scratch: Scratch::new(),
            extensions: Extensions::all(),
            messages: RefCell::new(Vec::new()),
        }
    }

    /// Replace existing outputs (defaults to true).
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Format of the output raster (defaults to ASCII grid).
    #[must_use]
    pub fn format(mut self, format: GridFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn grid_format(&self) -> GridFormat {
        self.format
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    pub fn extension_registry(&self) -> &Extensions {
        &self.extensions
    }

    /// Records a progress message and logs it.
    pub fn message<S: Into<String>>(&self, msg: S) {
        let msg = msg.into();
        info!("{msg}");
        self.messages.borrow_mut().push(msg);
    }

    /// Returns every message recorded so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Returns the path for output `file_name` in the workspace,
    /// creating the workspace if needed.
    ///
    /// Fails if the file exists and overwriting is disabled.
    pub(crate) fn output_path(&self, file_name: &str) -> Result<PathBuf, SwathError> {
        std::fs::create_dir_all(&self.workspace)?;
        let path = self.workspace.join(file_name);
        if !self.overwrite && path.exists() {
            return Err(SwathError::Exists(path));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::Context;
    use crate::SwathError;
    use std::fs;

    #[test]
    fn test_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().join("nested").join("out");
        let ctx = Context::new(&workspace);
        let path = ctx.output_path("mean.asc").unwrap();
        assert!(workspace.is_dir());
        fs::write(&path, "").unwrap();
        // Overwrite is on by default.
        assert!(ctx.output_path("mean.asc").is_ok());

        let ctx = Context::new(&workspace).overwrite(false);
        assert!(matches!(
            ctx.output_path("mean.asc"),
            Err(SwathError::Exists(_))
        ));
        assert!(ctx.output_path("max.asc").is_ok());
    }

    #[test]
    fn test_messages_in_order() {
        let ctx = Context::new("unused");
        ctx.message("first");
        ctx.message(String::from("second"));
        assert_eq!(ctx.messages(), vec!["first", "second"]);
    }
}
