//! Discovering and loading plugin files from a project directory.

use super::{PluginModule, Registrations};
use crate::context::PipelineContext;
use crate::errors::{AlfrdError, PluginLoadError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a directory load registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Files loaded, in load order.
    pub files: Vec<PathBuf>,
    /// Everything the files registered.
    pub registrations: Registrations,
    /// Non-fatal problems.
    pub warnings: Vec<String>,
}

/// Loads every plugin file of a directory through a [`PluginModule`].
///
/// Each file is loaded at most once per loader.
pub struct PluginLoader {
    module: Box<dyn PluginModule>,
    pattern: String,
    loaded: HashSet<PathBuf>,
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("pattern", &self.pattern)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl PluginLoader {
    /// Creates a loader matching `*.json`.
    #[must_use]
    pub fn new(module: Box<dyn PluginModule>) -> Self {
        Self {
            module,
            pattern: "*.json".to_string(),
            loaded: HashSet::new(),
        }
    }

    /// Sets the file-name pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Lists matching files in `dir`, sorted.
    ///
    /// # Errors
    ///
    /// Returns `AlfrdError::Config` if the pattern is not a valid glob.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, AlfrdError> {
        let pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            self.pattern
        );
        let mut files: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| AlfrdError::Config(format!("invalid plugin pattern '{}': {e}", self.pattern)))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Loads one file unless it was already loaded.
    ///
    /// # Errors
    ///
    /// Returns the module's `PluginLoadError`.
    pub fn load_file(
        &mut self,
        path: &Path,
        ctx: &mut PipelineContext,
    ) -> Result<Registrations, PluginLoadError> {
        if self.loaded.contains(path) {
            return Ok(Registrations::default());
        }
        let registrations = self.module.load(path, ctx)?;
        self.loaded.insert(path.to_path_buf());
        info!(
            path = %path.display(),
            steps = registrations.steps.len(),
            validators = registrations.validators.len(),
            "Loaded plugin"
        );
        Ok(registrations)
    }

    /// Loads every matching file of `dir`.
    ///
    /// A load that leaves the context without steps is reported as a
    /// warning, not an error.
    ///
    /// # Errors
    ///
    /// Returns the first file's load error; nothing after it is loaded.
    pub fn load_dir(&mut self, dir: &Path, ctx: &mut PipelineContext) -> Result<LoadReport, AlfrdError> {
        let mut report = LoadReport::default();
        for path in self.discover(dir)? {
            if self.loaded.contains(&path) {
                continue;
            }
            let registrations = self.load_file(&path, ctx)?;
            report.registrations.extend(registrations);
            report.files.push(path);
        }

        if ctx.steps.is_empty() {
            let message = format!(
                "No steps found in {}. Add plugins to the project directory.",
                dir.display()
            );
            warn!("{message}");
            report.warnings.push(message);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamSignature;
    use crate::plugins::MockPluginModule;
    use crate::testing::returning;
    use pretty_assertions::assert_eq;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), "{}").unwrap();
        }
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["b.json", "a.json", "notes.txt"]);

        let loader = PluginLoader::new(Box::new(MockPluginModule::new()));
        let files = loader.discover(dir.path()).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_each_file_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.json"]);

        let mut module = MockPluginModule::new();
        module.expect_load().times(1).returning(|_, ctx| {
            ctx.register_step("s", "", ParamSignature::new(), returning(1))
                .map_err(|e| PluginLoadError::new("a.json", e.to_string()))?;
            Ok(Registrations {
                steps: vec!["s".to_string()],
                validators: Vec::new(),
            })
        });

        let mut loader = PluginLoader::new(Box::new(module));
        let mut ctx = PipelineContext::new();
        let first = loader.load_dir(dir.path(), &mut ctx).unwrap();
        let second = loader.load_dir(dir.path(), &mut ctx).unwrap();

        assert_eq!(first.registrations.steps, vec!["s"]);
        assert!(first.warnings.is_empty());
        assert!(second.files.is_empty());
        assert_eq!(ctx.steps.len(), 1);
    }

    #[test]
    fn test_load_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.json", "b.json"]);

        let mut module = MockPluginModule::new();
        module
            .expect_load()
            .times(1)
            .returning(|path, _| Err(PluginLoadError::new(path, "syntax error")));

        let mut loader = PluginLoader::new(Box::new(module));
        let err = loader
            .load_dir(dir.path(), &mut PipelineContext::new())
            .unwrap_err();

        match err {
            AlfrdError::PluginLoad(e) => assert!(e.path.ends_with("a.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_steps_warns() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = PluginLoader::new(Box::new(MockPluginModule::new()));
        let report = loader
            .load_dir(dir.path(), &mut PipelineContext::new())
            .unwrap();

        assert!(report.files.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_custom_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.json", "b.plugin"]);

        let loader = PluginLoader::new(Box::new(MockPluginModule::new())).with_pattern("*.plugin");
        let files = loader.discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("b.plugin"));
    }
}
