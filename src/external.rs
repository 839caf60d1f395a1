use crate::command::{CommandFactory, ExecutableCommand, Flow};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// A program launched in a child process.
///
/// The child inherits the shell's terminal and the shell blocks until it has
/// exited or been killed by a signal.
pub struct ExternalCommand {
    name: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: OsString, args: Vec<OsString>) -> Self {
        Self { name, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let executable = find_command_path(OsStr::new(&search_paths), Path::new(&name))?;
        Some(Box::new(ExternalCommand::new(
            executable.as_os_str().to_owned(),
            args.iter().map(OsString::from).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow> {
        // Anything a builtin left buffered must appear before the child's output.
        stdout.flush()?;

        let mut child = std::process::Command::new(&self.name)
            .args(&self.args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn()
            .with_context(|| format!("{}", Path::new(&self.name).display()))?;
        tracing::debug!(program = ?self.name, pid = child.id(), "spawned");

        let exit_status = child.wait()?;
        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        tracing::debug!(program = ?self.name, code, "child finished");
        Ok(Flow::Continue)
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an existing file.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.is_file() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => {
            // Empty path -> not found
            None
        }
        (Some(x), None) => {
            // Single component -> search in PATH
            find_in_path(search_paths, x.as_os_str()).map(Cow::Owned)
        }
        _ => {
            // Multiple components -> search in current dir
            find_by_path(path).map(Cow::Borrowed)
        }
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::lock_current_dir;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    /// Process variables, with the working directory pinned to `dir`.
    fn env_in(dir: &Path) -> Environment {
        let mut env = {
            let _lock = lock_current_dir();
            Environment::new(crate::history::History::new(1))
        };
        env.current_dir = dir.to_path_buf();
        env
    }

    #[test]
    fn absolute_existing_file() {
        let dir = tempdir().unwrap();
        let tool = dir.path().join("tool");
        File::create(&tool).unwrap();
        let found = find_command_path(osstr(""), &tool).expect("absolute path should resolve");
        assert_eq!(found.as_ref(), tool.as_path());
    }

    #[test]
    fn absolute_nonexisting() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nonexisting");
        let res = find_command_path(osstr(""), &missing);
        assert!(res.is_none());
    }

    #[test]
    fn single_component_found_in_path() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        File::create(second.path().join("tool")).unwrap();
        let search = std::env::join_paths([first.path(), second.path()]).unwrap();

        let found = find_command_path(&search, Path::new("tool")).expect("tool is on the path");
        assert_eq!(found.as_ref(), second.path().join("tool").as_path());
    }

    #[test]
    fn directories_on_path_are_skipped() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::create_dir(first.path().join("tool")).unwrap();
        File::create(second.path().join("tool")).unwrap();
        let search = std::env::join_paths([first.path(), second.path()]).unwrap();

        let found = find_command_path(&search, Path::new("tool")).unwrap();
        assert_eq!(found.as_ref(), second.path().join("tool").as_path());
    }

    #[test]
    fn single_component_not_found_in_path() {
        let dir = tempdir().unwrap();
        let res = find_command_path(dir.path().as_os_str(), Path::new("nonexisting"));
        assert!(res.is_none(), "Expected not to find 'nonexisting' in PATH");
    }

    #[test]
    #[cfg(unix)]
    fn relative_paths_resolve_from_current_dir() {
        let _lock = lock_current_dir();
        let cwd_before = std::env::current_dir().expect("cwd");
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        File::create(dir.path().join("bin").join("sh")).unwrap();
        File::create(dir.path().join("foo")).unwrap();

        std::env::set_current_dir(dir.path()).expect("set cwd");
        let nested = find_command_path(osstr("/does/not/matter"), Path::new("bin/sh"))
            .map(|p| p.into_owned());
        let dotted = find_command_path(osstr("/does/not/matter"), Path::new("./foo"))
            .map(|p| p.into_owned());
        // Restore cwd before asserting so a failure does not leak into other tests
        std::env::set_current_dir(&cwd_before).ok();

        assert_eq!(nested.as_deref(), Some(Path::new("bin/sh")));
        assert_eq!(dotted.as_deref(), Some(Path::new("./foo")));
    }

    #[test]
    fn empty_path_is_none() {
        let res = find_command_path(osstr("/bin"), Path::new(""));
        assert!(res.is_none(), "Empty path should not resolve to anything");
    }

    #[test]
    #[cfg(unix)]
    fn spawn_failure_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let script = dir.path().join("not-executable");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

        let mut env = env_in(dir.path());
        let cmd = Box::new(ExternalCommand::new(script.into_os_string(), vec![]));
        let err = cmd.execute(&mut Vec::new(), &mut env).unwrap_err();
        assert!(err.to_string().contains("not-executable"));
    }

    #[test]
    #[cfg(unix)]
    fn child_runs_in_engine_directory() {
        let dir = tempdir().unwrap();
        let mut env = env_in(dir.path());

        let cmd = Box::new(ExternalCommand::new(
            "/bin/sh".into(),
            vec!["-c".into(), "touch marker".into()],
        ));
        assert_eq!(cmd.execute(&mut Vec::new(), &mut env).unwrap(), Flow::Continue);
        assert!(dir.path().join("marker").exists());
    }
}
