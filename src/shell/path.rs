//! `PATH` lookup for the collaborator binaries.

use std::ffi::OsString;
use std::path::PathBuf;

/// Resolve `program` the way a shell would: names containing a path
/// separator are taken as-is, anything else is searched along `PATH`.
pub fn locate_program(program: &str) -> which::Result<PathBuf> {
    locate_in(program, std::env::var_os("PATH"))
}

fn locate_in(program: &str, path_var: Option<OsString>) -> which::Result<PathBuf> {
    if program.is_empty() {
        return Err(which::Error::CannotFindBinaryPath);
    }
    let cwd = std::env::current_dir().map_err(|_| which::Error::CannotGetCurrentDirAndPathListEmpty)?;
    which::which_in(program, path_var, cwd)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn make_file(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn finds_first_executable_on_path() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        make_file(a.path(), "vrsctl", 0o644);
        let expected = make_file(b.path(), "vrsctl", 0o755);
        let path_var = std::env::join_paths([a.path(), b.path()]).unwrap();

        assert_eq!(locate_in("vrsctl", Some(path_var.clone())).unwrap(), expected);
        assert!(locate_in("fzf", Some(path_var)).is_err());
        assert!(locate_in("vrsctl", None).is_err());
    }

    #[test]
    fn explicit_paths_are_checked_directly() {
        let dir = tempfile::tempdir().unwrap();
        let exe = make_file(dir.path(), "picker", 0o700);
        let plain = make_file(dir.path(), "notes", 0o600);

        assert!(locate_in(exe.to_str().unwrap(), None).is_ok());
        assert!(locate_in(plain.to_str().unwrap(), None).is_err());
        assert!(locate_in(dir.path().join("absent").to_str().unwrap(), None).is_err());
        assert!(locate_in("", None).is_err());
    }
}
