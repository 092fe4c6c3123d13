//! Project directories holding plugin files.

use crate::config::AlfrdConfig;
use crate::context::PipelineContext;
use crate::errors::{AlfrdError, ProjectError};
use crate::plugins::{LoadReport, ManifestPlugin, PluginLoader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A named project directory under the projects root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    dir: PathBuf,
}

impl Project {
    /// Opens an existing project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidName` for a name that is not a plain
    /// directory name, or `ProjectError::NotFound` if the directory does not
    /// exist.
    pub fn open(config: &AlfrdConfig, name: &str) -> Result<Self, ProjectError> {
        let dir = config.project_dir(name)?;
        if !dir.is_dir() {
            return Err(ProjectError::NotFound {
                name: name.to_string(),
                dir,
            });
        }
        Ok(Self {
            name: name.to_string(),
            dir,
        })
    }

    /// Creates the project directory if needed.
    ///
    /// Returns the project and whether the directory was created.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidName` for a name that is not a plain
    /// directory name, or an IO error if the directory cannot be created.
    pub fn init(config: &AlfrdConfig, name: &str) -> Result<(Self, bool), AlfrdError> {
        let dir = config.project_dir(name)?;
        let created = !dir.is_dir();
        if created {
            std::fs::create_dir_all(&dir)?;
            info!(project = name, dir = %dir.display(), "Created project directory");
        }
        Ok((
            Self {
                name: name.to_string(),
                dir,
            },
            created,
        ))
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the project directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies (or symlinks) a plugin file into the project.
    ///
    /// An existing file of the same name is replaced. Returns the
    /// destination path.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::PluginSourceMissing` if `source` is not a file,
    /// or an IO error from copying or linking.
    pub fn add_plugin(&self, source: &Path, symlink: bool) -> Result<PathBuf, AlfrdError> {
        if !source.is_file() {
            return Err(ProjectError::PluginSourceMissing {
                path: source.to_path_buf(),
            }
            .into());
        }
        let file_name = source.file_name().ok_or_else(|| ProjectError::PluginSourceMissing {
            path: source.to_path_buf(),
        })?;
        let dest = self.dir.join(file_name);

        if symlink {
            if dest.symlink_metadata().is_ok() {
                std::fs::remove_file(&dest)?;
            }
            link(&source.canonicalize()?, &dest)?;
        } else {
            std::fs::copy(source, &dest)?;
        }
        debug!(project = %self.name, dest = %dest.display(), symlink, "Added plugin");
        Ok(dest)
    }

    /// Deletes the project directory and everything in it.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be removed.
    pub fn remove(self) -> Result<PathBuf, AlfrdError> {
        std::fs::remove_dir_all(&self.dir)?;
        info!(project = %self.name, dir = %self.dir.display(), "Removed project");
        Ok(self.dir)
    }

    /// Loads the project's plugins into `ctx` with the manifest loader.
    ///
    /// # Errors
    ///
    /// Returns the first plugin load error.
    pub fn load(&self, config: &AlfrdConfig, ctx: &mut PipelineContext) -> Result<LoadReport, AlfrdError> {
        PluginLoader::new(Box::new(ManifestPlugin::new()))
            .with_pattern(config.plugin_pattern.clone())
            .load_dir(&self.dir, ctx)
    }
}

#[cfg(unix)]
fn link(source: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, dest)
}

#[cfg(not(unix))]
fn link(_source: &Path, _dest: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinked plugins are only supported on unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(home: &Path) -> AlfrdConfig {
        AlfrdConfig::with_home(home)
    }

    #[test]
    fn test_open_missing() {
        let home = tempfile::tempdir().unwrap();
        let err = Project::open(&config(home.path()), "vlbi").unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { ref name, .. } if name == "vlbi"));
    }

    #[test]
    fn test_init_then_open() {
        let home = tempfile::tempdir().unwrap();
        let config = config(home.path());

        let (project, created) = Project::init(&config, "vlbi").unwrap();
        assert!(created);
        assert_eq!(project.dir(), home.path().join("projects/vlbi"));

        let (_, created) = Project::init(&config, "vlbi").unwrap();
        assert!(!created);

        assert_eq!(Project::open(&config, "vlbi").unwrap().name(), "vlbi");
    }

    #[test]
    fn test_names_stay_inside_projects_root() {
        let home = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let config = config(home.path());
        let absolute = outside.path().display().to_string();

        for name in [absolute.as_str(), "..", "a/b"] {
            let err = Project::open(&config, name).unwrap_err();
            assert!(matches!(err, ProjectError::InvalidName { .. }), "{name} opened");
            let err = Project::init(&config, name).unwrap_err();
            assert!(
                matches!(err, AlfrdError::Project(ProjectError::InvalidName { .. })),
                "{name} initialised"
            );
        }
        assert!(outside.path().is_dir());
        assert!(!home.path().join("projects/a").exists());
    }

    #[test]
    fn test_add_plugin_copy() {
        let home = tempfile::tempdir().unwrap();
        let (project, _) = Project::init(&config(home.path()), "vlbi").unwrap();
        let source = home.path().join("steps.json");
        std::fs::write(&source, "{}").unwrap();

        let dest = project.add_plugin(&source, false).unwrap();
        assert_eq!(dest, project.dir().join("steps.json"));
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "{}");
    }

    #[cfg(unix)]
    #[test]
    fn test_add_plugin_symlink_replaces() {
        let home = tempfile::tempdir().unwrap();
        let (project, _) = Project::init(&config(home.path()), "vlbi").unwrap();
        let source = home.path().join("steps.json");
        std::fs::write(&source, "{\"steps\": []}").unwrap();
        std::fs::write(project.dir().join("steps.json"), "old").unwrap();

        let dest = project.add_plugin(&source, true).unwrap();
        assert!(dest.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "{\"steps\": []}");
    }

    #[test]
    fn test_add_missing_plugin() {
        let home = tempfile::tempdir().unwrap();
        let (project, _) = Project::init(&config(home.path()), "vlbi").unwrap();
        let err = project.add_plugin(&home.path().join("nope.json"), false).unwrap_err();
        assert!(matches!(err, AlfrdError::Project(ProjectError::PluginSourceMissing { .. })));
    }

    #[test]
    fn test_remove() {
        let home = tempfile::tempdir().unwrap();
        let config = config(home.path());
        let (project, _) = Project::init(&config, "vlbi").unwrap();

        let dir = project.remove().unwrap();
        assert!(!dir.exists());
        assert!(Project::open(&config, "vlbi").is_err());
    }

    #[test]
    fn test_load_manifest() {
        let home = tempfile::tempdir().unwrap();
        let config = config(home.path());
        let (project, _) = Project::init(&config, "vlbi").unwrap();
        std::fs::write(
            project.dir().join("steps.json"),
            r#"{"steps": [{"name": "a", "command": "echo a"}]}"#,
        )
        .unwrap();

        let mut ctx = PipelineContext::new();
        let report = project.load(&config, &mut ctx).unwrap();

        assert_eq!(report.registrations.steps, vec!["a"]);
        assert!(report.warnings.is_empty());
    }
}
