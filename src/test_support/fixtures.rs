//! Template fixtures written to temporary directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A project directory holding a template file.
pub struct TemplateFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TemplateFixture {
    /// Write `contents` to `file_name` in a fresh temporary directory.
    pub fn new(file_name: &str, contents: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        std::fs::write(&path, contents).unwrap();
        TemplateFixture { dir, path }
    }

    /// A TOML template with a `null` build named `smoke` and a `file` build
    /// named `motd` whose target lives inside the fixture directory.
    pub fn two_builds() -> Self {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out").join("motd.txt");
        let contents = two_build_template(&target);
        let path = dir.path().join("drydock.toml");
        std::fs::write(&path, contents).unwrap();
        TemplateFixture { dir, path }
    }

    /// Resolve a path relative to the fixture directory.
    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }
}

/// Render the two-build template with the file build writing to `target`.
pub fn two_build_template(target: &Path) -> String {
    format!(
        r#"
[[builds]]
name = "smoke"
type = "null"
[builds.config]
message = "nothing to do"

[[builds]]
name = "motd"
type = "file"
[builds.config]
target = {target:?}
content = "welcome aboard"
"#,
        target = target.display().to_string()
    )
}
