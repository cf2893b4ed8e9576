//! Scope-checked filesystem primitives shared by the Manager/Master and
//! Coder/Tester interpreters.

use std::path::{Path, PathBuf};

/// Resolves `rel_path` (taken relative to the project root) and checks it
/// falls inside `scope_dir`. Returns the resolved absolute path on success.
pub fn resolve_in_scope(
    scope_dir: &Path,
    project_root: &Path,
    rel_path: &str,
) -> Result<PathBuf, String> {
    let target = project_root.join(rel_path);
    let scope_canon = scope_dir.to_path_buf();
    if target.starts_with(&scope_canon) {
        Ok(target)
    } else {
        Err(format!("Destination {} is out of scope", rel_path))
    }
}

pub fn create_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::File::create(path)?;
    Ok(())
}

pub fn create_folder(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

pub fn delete_file(path: &Path) -> std::io::Result<()> {
    std::fs::remove_file(path)
}

pub fn delete_folder(path: &Path) -> std::io::Result<()> {
    std::fs::remove_dir_all(path)
}

/// README naming convention used by `UPDATE_README` and folder `READ`:
/// `<folder_name>_README.md` inside the folder itself.
pub fn readme_path_for(folder: &Path) -> PathBuf {
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    folder.join(format!("{}_README.md", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_paths_outside_scope() {
        let scope = PathBuf::from("/project/src/widgets");
        let root = PathBuf::from("/project");
        assert!(resolve_in_scope(&scope, &root, "src/other/file.rs").is_err());
    }

    #[test]
    fn accepts_paths_inside_scope() {
        let scope = PathBuf::from("/project/src/widgets");
        let root = PathBuf::from("/project");
        assert!(resolve_in_scope(&scope, &root, "src/widgets/button.rs").is_ok());
    }

    #[test]
    fn readme_path_uses_folder_name() {
        let folder = PathBuf::from("/project/src/widgets");
        assert_eq!(
            readme_path_for(&folder),
            PathBuf::from("/project/src/widgets/widgets_README.md")
        );
    }
}
