//! `key = value` input files.

use super::ParamValue;
use crate::errors::AlfrdError;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Parameters read from one or more input files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFile {
    /// Parsed parameters; later files override earlier ones.
    pub params: BTreeMap<String, ParamValue>,
    /// Every matched file, in read order.
    pub files: Vec<PathBuf>,
    /// Directory of the last matched file.
    pub input_folder: Option<PathBuf>,
}

#[allow(clippy::expect_used)]
static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^=]+?)\s*=(.*)$").expect("assignment pattern is valid"));

/// Parses input file contents.
///
/// Lines containing `#` are ignored entirely. Other lines are split at the
/// first `=`; the key is trimmed and the value coerced with
/// [`ParamValue::parse`].
#[must_use]
pub fn parse_input(contents: &str) -> BTreeMap<String, ParamValue> {
    contents
        .lines()
        .filter(|line| !line.contains('#'))
        .filter_map(|line| ASSIGNMENT.captures(line))
        .map(|caps| (caps[1].to_string(), ParamValue::parse(&caps[2])))
        .collect()
}

/// Finds and reads input files under `folder` whose names end with `suffix`.
///
/// Looks in `folder` itself first, then one and two levels below, stopping
/// at the first level that has matches.
///
/// # Errors
///
/// Returns an error if a matched file cannot be read or the glob pattern is
/// invalid.
pub fn read_input_files(folder: &Path, suffix: &str) -> Result<InputFile, AlfrdError> {
    let mut files = Vec::new();
    for depth in ["*", "*/*", "*/*/*"] {
        let pattern = format!("{}/{depth}{suffix}", folder.display());
        let matches = glob::glob(&pattern)
            .map_err(|e| AlfrdError::Config(format!("invalid input pattern '{pattern}': {e}")))?;
        files = matches.filter_map(Result::ok).filter(|p| p.is_file()).collect();
        if !files.is_empty() {
            break;
        }
    }

    let mut input = InputFile {
        input_folder: files.last().and_then(|f| f.parent().map(Path::to_path_buf)),
        ..InputFile::default()
    };

    for path in &files {
        let contents = std::fs::read_to_string(path)?;
        let parsed = parse_input(&contents);
        debug!(file = %path.display(), count = parsed.len(), "Read input file");
        input.params.extend(parsed);
    }
    input.files = files;

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_input() {
        let parsed = parse_input(
            "n = 3\n# comment = 1\nscale=0.5\nname = target  \nflag = True\nnot an assignment\nurl=a=b\n",
        );

        assert_eq!(parsed.get("n"), Some(&ParamValue::Int(3)));
        assert_eq!(parsed.get("scale"), Some(&ParamValue::Float(0.5)));
        assert_eq!(parsed.get("name"), Some(&ParamValue::from("target")));
        assert_eq!(parsed.get("flag"), Some(&ParamValue::Bool(true)));
        assert_eq!(parsed.get("url"), Some(&ParamValue::from("a=b")));
        assert!(!parsed.contains_key("# comment"));
        assert_eq!(parsed.len(), 5);
    }

    #[test]
    fn test_inline_comment_drops_line() {
        let parsed = parse_input("a = 1 # trailing\n");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_read_input_files_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("obs");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("run.inp"), "n = 4\n").unwrap();

        let input = read_input_files(dir.path(), ".inp").unwrap();
        assert_eq!(input.files.len(), 1);
        assert_eq!(input.params.get("n"), Some(&ParamValue::Int(4)));
        assert_eq!(input.input_folder.as_deref(), Some(nested.as_path()));
    }

    #[test]
    fn test_read_input_files_top_level_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.inp"), "n = 1\n").unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.inp"), "n = 2\n").unwrap();

        let input = read_input_files(dir.path(), ".inp").unwrap();
        assert_eq!(input.files.len(), 1);
        assert_eq!(input.params.get("n"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn test_read_input_files_none() {
        let dir = tempfile::tempdir().unwrap();
        let input = read_input_files(dir.path(), ".inp").unwrap();
        assert!(input.files.is_empty());
        assert!(input.input_folder.is_none());
    }
}
