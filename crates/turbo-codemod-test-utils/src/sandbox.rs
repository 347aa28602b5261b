//! Hermetic sandbox for driving the `turbo-codemod` binary in tests.
//!
//! - Everything lives under an `assert_fs::TempDir` and is cleaned up on drop
//! - A private `HOME` and `.gitconfig`, so commits work without user config
//! - A `bin/` directory prepended to `PATH` for fake `npm`/`pnpm`/`yarn`/`turbo`
//! - Colors disabled so output can be snapshotted
//!
//! ## Quick example
//! ```no_run
//! use turbo_codemod_test_utils::Sandbox;
//!
//! let mut sb = Sandbox::new();
//! sb.write("package.json", r#"{ "turbo": { "pipeline": {} } }"#)
//!     .fake_bin("npm", "8.19.2");
//!
//! let out = sb.run("turbo-codemod", ["transform", "create-turbo-config", "."]);
//! assert_eq!(out.code, 0);
//! assert!(sb.exists("turbo.json"));
//! ```

use assert_fs::TempDir;
use assert_fs::fixture::PathChild;
use duct::Expression;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Sandbox {
    _root: TempDir,
    pub home: PathBuf,
    pub bin_dir: PathBuf,
    pub gitconfig: PathBuf,
    default_cwd: PathBuf,
}

/// Captured result of a finished process.
#[derive(Debug)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Create a new sandbox; all state is under an auto-cleaned TempDir.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        let home = root.child(".home").to_path_buf();
        let bin_dir = root.child(".bin").to_path_buf();
        let gitconfig = home.join(".gitconfig");
        let default_cwd = root.child("repo").to_path_buf();

        fs::create_dir_all(&home).expect("create home dir");
        fs::create_dir_all(&bin_dir).expect("create bin dir");
        fs::create_dir_all(&default_cwd).expect("create repo dir");
        fs::write(
            &gitconfig,
            "[user]\n    name = Sandbox\n    email = test@example.com\n[init]\n    defaultBranch = main\n",
        )
        .expect("write gitconfig");

        Self {
            _root: root,
            home,
            bin_dir,
            gitconfig,
            default_cwd,
        }
    }

    /// The directory commands run in and relative paths resolve against.
    pub fn repo_path(&self) -> &Path {
        &self.default_cwd
    }

    /// Write/overwrite a file relative to the repo directory.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.default_cwd.join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    pub fn read<P: AsRef<Path>>(&self, rel: P) -> String {
        let p = self.default_cwd.join(rel);
        fs::read_to_string(&p).unwrap_or_else(|e| panic!("read {}: {e}", p.display()))
    }

    pub fn read_json<P: AsRef<Path>>(&self, rel: P) -> serde_json::Value {
        let rel = rel.as_ref();
        serde_json::from_str(&self.read(rel))
            .unwrap_or_else(|e| panic!("parse {}: {e}", rel.display()))
    }

    pub fn exists<P: AsRef<Path>>(&self, rel: P) -> bool {
        self.default_cwd.join(rel).exists()
    }

    /// Install an executable on the sandbox `PATH` that prints `stdout` and exits 0.
    #[cfg(unix)]
    pub fn fake_bin(&mut self, name: &str, stdout: &str) -> &mut Self {
        use std::os::unix::fs::PermissionsExt;

        let p = self.bin_dir.join(name);
        fs::write(&p, format!("#!/bin/sh\necho '{stdout}'\n")).expect("write fake bin");
        fs::set_permissions(&p, fs::Permissions::from_mode(0o755)).expect("chmod fake bin");
        self
    }

    /// Turn the repo directory into a git repository with everything committed.
    pub fn init_git(&mut self) -> &mut Self {
        self.git(&["init", "--quiet"]);
        self.commit("init")
    }

    /// Stage all changes and commit with the given message.
    pub fn commit<S: AsRef<str>>(&mut self, msg: S) -> &mut Self {
        self.git(&["add", "-A"]);
        self.git(&["commit", "--quiet", "--allow-empty", "-m", msg.as_ref()]);
        self
    }

    fn git(&self, args: &[&str]) {
        self.cmd("git", args)
            .stdout_null()
            .stderr_null()
            .run()
            .unwrap_or_else(|e| panic!("git {args:?} failed: {e}"));
    }

    /// Build a `duct::Expression` pre-wired with the sandbox env and default cwd.
    pub fn cmd<S: AsRef<OsStr>, I: IntoIterator>(&self, program: S, args: I) -> Expression
    where
        I::Item: AsRef<OsStr>,
    {
        let program_str = program.as_ref().to_string_lossy();
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().to_string())
            .collect();
        let expr = duct::cmd(&*program_str, args).dir(&self.default_cwd);
        self.inject_env(expr)
    }

    /// Run a cargo binary inside this sandbox, capturing its output whatever the exit status.
    pub fn run<I>(&self, program: &str, args: I) -> RunOutput
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program);
        let output = self
            .cmd(cargo_bin_path, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .unwrap_or_else(|e| panic!("failed to spawn {program}: {e}"));

        RunOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Run a cargo binary and render exit code and output for `insta`, with
    /// sandbox paths replaced by `[REPO]`.
    pub fn snapshot_run<I>(&self, program: &str, args: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let out = self.run(program, args);
        let rendered = format!(
            "Exit Code: {}\n--- STDOUT ---\n{}\n--- STDERR ---\n{}",
            out.code, out.stdout, out.stderr
        );

        let repo = fs::canonicalize(&self.default_cwd).unwrap_or_else(|_| self.default_cwd.clone());
        rendered
            .replace(&repo.to_string_lossy().into_owned(), "[REPO]")
            .replace(&self.default_cwd.to_string_lossy().into_owned(), "[REPO]")
    }

    pub fn inject_env(&self, mut expr: Expression) -> Expression {
        let mut env_map: HashMap<String, String> = HashMap::new();
        let mut path = self.bin_dir.to_string_lossy().into_owned();
        if let Ok(system_path) = std::env::var("PATH") {
            path = format!("{path}:{system_path}");
        }
        env_map.insert("PATH".into(), path);
        env_map.insert("HOME".into(), self.home.to_string_lossy().into_owned());
        env_map.insert(
            "GIT_CONFIG_GLOBAL".into(),
            self.gitconfig.to_string_lossy().into_owned(),
        );
        env_map.insert(
            "GIT_CONFIG_SYSTEM".into(),
            if cfg!(windows) { "NUL" } else { "/dev/null" }.into(),
        );
        env_map.insert("NO_COLOR".into(), "1".into());

        expr = expr.full_env(&env_map);
        expr
    }
}
