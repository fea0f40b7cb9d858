//! Filesystem side of injection.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::GenerateError;

use super::merge_regions;

/// What [`inject`] did to an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Reads an artifact, returning `None` when it does not exist yet.
pub fn read_artifact(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replaces `path` with `text` via a sibling temp file and a rename, so readers never
/// observe a half-written artifact.
pub fn write_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    fs::write(temp_path, text)?;
    if let Err(e) = fs::rename(temp_path, path) {
        let _ = fs::remove_file(temp_path);
        return Err(e);
    }

    debug!("Wrote {} bytes to {:?}", text.len(), path);
    Ok(())
}

/// Merges `generated` into the `label` region of the artifact at `path`, creating the
/// artifact from the standard scaffold if it is missing. The file is only rewritten
/// when its content changes.
pub fn inject(path: &Path, generated: &str, label: &str) -> Result<InjectOutcome, GenerateError> {
    let existing = read_artifact(path).map_err(|e| GenerateError::io(path, e))?;
    let merged = merge_regions(path, existing.as_deref(), &[(label, generated)]).map_err(|source| {
        GenerateError::Inject {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let outcome = match existing {
        None => InjectOutcome::Created,
        Some(current) if current == merged => return Ok(InjectOutcome::Unchanged),
        Some(_) => InjectOutcome::Updated,
    };
    write_atomic(path, &merged).map_err(|e| GenerateError::io(path, e))?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inject_creates_then_leaves_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("include/mcrl2/x/traverser.inc.h");

        assert_eq!(inject(&path, "f();\n", "generated code").unwrap(), InjectOutcome::Created);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("/// \\file mcrl2/x/traverser.inc.h"));
        assert!(text.contains("//--- start generated code ---//\nf();\n//--- end generated code ---//\n"));

        assert_eq!(inject(&path, "f();\n", "generated code").unwrap(), InjectOutcome::Unchanged);
        assert_eq!(inject(&path, "g();\n", "generated code").unwrap(), InjectOutcome::Updated);
        assert!(!dir.path().join("include/mcrl2/x/traverser.inc.h.tmp").exists());
    }

    #[test]
    fn test_inject_without_markers_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.h");
        fs::write(&path, "// no markers\n").unwrap();

        let err = inject(&path, "f();\n", "generated code").unwrap_err();
        assert!(matches!(err, GenerateError::Inject { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "// no markers\n");
    }

    #[test]
    fn test_read_missing_artifact() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_artifact(&dir.path().join("absent.h")).unwrap(), None);
    }
}
