//! Workspace path resolution.
//!
//! Action and tool paths are either absolute, or relative to a workspace
//! root. Joining always uses `/` so resolved paths look the same on every
//! host, which is also what the checkpoint keys are compared on.

/// Whether `path` is absolute: a leading `/` or `\`, or a drive letter
/// such as `C:`.
pub fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Resolves `path` against `root`.
///
/// Absolute paths are returned verbatim. Relative paths lose any leading
/// `./` and are joined to `root` with a single `/`.
pub fn resolve(root: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    let relative = path.trim_start_matches("./");
    let root = root.trim_end_matches(['/', '\\']);
    if root.is_empty() {
        return format!("/{relative}");
    }
    if relative.is_empty() || relative == "." {
        return root.to_string();
    }
    format!("{root}/{relative}")
}

/// The process's current directory, used as the default workspace root.
pub(crate) fn current_dir() -> String {
    std::env::current_dir()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_else(|_| ".".to_string())
}

/// Quotes `arg` for a POSIX shell command line.
pub(crate) fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@,+".contains(c))
    {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
