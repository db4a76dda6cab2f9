/// Path helpers shared by the builder and the pre-count pass.
use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute and lexically clean it.
///
/// Relative paths are joined onto the current directory, `.` segments are
/// dropped and `..` folds into its parent. Symlinks are not resolved, so the
/// result names the same place the caller asked for.
pub fn normalize_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to remove the root, so "/.." stays "/".
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}

/// `true` if a final path segment names a hidden (dot) entry.
///
/// `.` and `..` are not hidden.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// Extension of a file name: everything after the last `.`.
///
/// Names that begin with `.` never have an extension, so `.bashrc` and
/// `.env.local` both yield `""`.
pub fn extension_of(name: &str) -> &str {
    if name.starts_with('.') {
        return "";
    }
    match name.rfind('.') {
        Some(pos) => &name[pos + 1..],
        None => "",
    }
}

/// Display name for a scan root: its final segment, or the whole path for
/// filesystem roots such as `/`.
pub fn root_display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}
