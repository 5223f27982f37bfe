//! A single build job.
//!
//! A build pairs one [`Builder`] with the raw configuration meant for it and
//! walks it through two phases:
//!
//! ```text
//!   Unprepared ──prepare()──▶ Prepared ──run()──▶ Prepared
//!                              ▲    │
//!                              └────┘ prepare() again
//! ```
//!
//! `prepare` must return before `run` is called. Calling `run` on a build that
//! was never prepared is a bug in the caller, so it panics instead of
//! returning an error. Builder errors from either phase are passed back as-is.
//!
//! Builds share nothing with each other and can be run on separate threads.

use std::fmt;

use anyhow::Result;

use crate::core::builder::{Builder, RawConfig};
use crate::core::ui::Ui;

/// A job that produces one image artifact.
pub trait Build: Send + Sync {
    /// Name used to tell this build apart from the others in a run.
    fn name(&self) -> &str;

    /// Hand the configuration to the builder for validation.
    fn prepare(&mut self) -> Result<()>;

    /// Run the builder. Panics if [`Build::prepare`] was never called.
    fn run(&self, ui: &dyn Ui) -> Result<()>;
}

/// Read-only view of a build given to its builder while it runs.
///
/// Builders use it for identity only; it has no way to reach the lifecycle
/// state of the build.
#[derive(Debug, Clone, Copy)]
pub struct BuildHandle<'a> {
    name: &'a str,
}

impl<'a> BuildHandle<'a> {
    pub fn new(name: &'a str) -> Self {
        BuildHandle { name }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }
}

/// The standard [`Build`] implementation.
///
/// The builder stays private to the crate, so `run` is the only way to reach
/// it from outside:
///
/// ```compile_fail
/// use drydock::{BuilderRegistry, CoreBuild};
///
/// let builder = BuilderRegistry::new().create("null").unwrap();
/// let build = CoreBuild::new("a", builder, serde_json::Value::Null);
/// let _ = build.builder();
/// ```
pub struct CoreBuild {
    name: String,
    builder: Box<dyn Builder>,
    raw_config: RawConfig,
    prepare_called: bool,
}

impl CoreBuild {
    pub fn new(name: impl Into<String>, builder: Box<dyn Builder>, raw_config: RawConfig) -> Self {
        let name = name.into();
        tracing::debug!(build = %name, "created build");

        CoreBuild {
            name,
            builder,
            raw_config,
            prepare_called: false,
        }
    }

    /// The configuration this build was created with.
    pub fn config(&self) -> &RawConfig {
        &self.raw_config
    }

    /// The builder this build drives. Crate-only; it bypasses the prepare
    /// check.
    pub(crate) fn builder(&self) -> &dyn Builder {
        self.builder.as_ref()
    }

    /// Whether `prepare` has been called at least once.
    pub fn is_prepared(&self) -> bool {
        self.prepare_called
    }

    fn handle(&self) -> BuildHandle<'_> {
        BuildHandle::new(&self.name)
    }
}

impl Build for CoreBuild {
    fn name(&self) -> &str {
        &self.name
    }

    /// Every call re-runs the builder's validation. The build counts as
    /// prepared once the builder returns, even if it returned an error; the
    /// error goes back to the caller, who decides whether to run anyway.
    fn prepare(&mut self) -> Result<()> {
        tracing::debug!(build = %self.name, "preparing");

        let result = self.builder.prepare(&self.raw_config);
        self.prepare_called = true;
        result
    }

    /// Running more than once is allowed; each call runs the builder again.
    fn run(&self, ui: &dyn Ui) -> Result<()> {
        if !self.prepare_called {
            panic!("Prepare must be called first");
        }

        tracing::debug!(build = %self.name, "running");
        self.builder.run(&self.handle(), ui)
    }
}

impl fmt::Debug for CoreBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreBuild")
            .field("name", &self.name)
            .field("raw_config", &self.raw_config)
            .field("prepare_called", &self.prepare_called)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::test_support::{CaptureUi, Call, RecordingBuilder};

    fn recorded_build(name: &str, config: RawConfig) -> (CoreBuild, RecordingBuilder) {
        let builder = RecordingBuilder::new();
        let build = CoreBuild::new(name, Box::new(builder.clone()), config);
        (build, builder)
    }

    #[test]
    fn test_new_build_is_unprepared() {
        let (build, recorder) = recorded_build("image-a", serde_json::json!({}));
        assert!(!build.is_prepared());
        assert_eq!(build.name(), "image-a");
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_prepare_then_run() {
        let config = serde_json::json!({ "disk_size": 4096 });
        let (mut build, recorder) = recorded_build("image-a", config.clone());
        let ui = CaptureUi::new();

        build.prepare().unwrap();
        assert!(build.is_prepared());
        build.run(&ui).unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Prepare(config),
                Call::Run {
                    build: "image-a".to_string()
                },
            ]
        );
        assert_eq!(ui.messages(), vec!["built"]);
    }

    #[test]
    #[should_panic(expected = "Prepare must be called first")]
    fn test_run_without_prepare_panics() {
        let (build, _recorder) = recorded_build("image-b", serde_json::json!({}));
        let _ = build.run(&CaptureUi::new());
    }

    #[test]
    fn test_run_without_prepare_never_reaches_builder() {
        let (build, recorder) = recorded_build("image-b", serde_json::json!({}));
        let ui = CaptureUi::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| build.run(&ui)));

        assert!(outcome.is_err());
        assert_eq!(recorder.run_count(), 0);
        assert!(ui.messages().is_empty());
    }

    #[test]
    fn test_prepare_twice_runs_validation_twice() {
        let (mut build, recorder) = recorded_build("image-c", serde_json::json!({"a": 1}));
        let ui = CaptureUi::new();

        build.prepare().unwrap();
        build.prepare().unwrap();
        build.run(&ui).unwrap();

        assert_eq!(recorder.prepare_count(), 2);
        assert_eq!(recorder.run_count(), 1);
        assert!(build.is_prepared());
    }

    #[test]
    fn test_failed_prepare_still_marks_prepared() {
        let recorder = RecordingBuilder::failing_prepare("bad disk size");
        let mut build = CoreBuild::new("image-d", Box::new(recorder.clone()), serde_json::json!({}));

        let err = build.prepare().unwrap_err();

        assert!(err.to_string().contains("bad disk size"));
        assert!(build.is_prepared());
        assert_eq!(recorder.prepare_count(), 1);
    }

    #[test]
    fn test_run_error_is_passed_through() {
        let recorder = RecordingBuilder::failing_run("hypervisor unreachable");
        let mut build = CoreBuild::new("image-e", Box::new(recorder.clone()), serde_json::json!({}));

        build.prepare().unwrap();
        let err = build.run(&CaptureUi::new()).unwrap_err();

        assert_eq!(err.to_string(), "hypervisor unreachable");
        assert_eq!(recorder.run_count(), 1);
    }

    #[test]
    fn test_run_may_repeat() {
        let (mut build, recorder) = recorded_build("image-f", serde_json::json!({}));
        let ui = CaptureUi::new();

        build.prepare().unwrap();
        build.run(&ui).unwrap();
        build.run(&ui).unwrap();

        assert_eq!(recorder.run_count(), 2);
        assert_eq!(ui.messages(), vec!["built", "built"]);
    }

    #[test]
    fn test_config_and_builder_unchanged_by_lifecycle() {
        let config = serde_json::json!({ "iso": "debian.iso", "cpus": 2 });
        let (mut build, _recorder) = recorded_build("image-g", config.clone());
        let builder_addr = build.builder() as *const dyn Builder as *const ();
        let ui = CaptureUi::new();

        for _ in 0..3 {
            build.prepare().unwrap();
            build.run(&ui).unwrap();
        }

        assert_eq!(build.config(), &config);
        assert_eq!(build.builder() as *const dyn Builder as *const (), builder_addr);
    }

    #[test]
    fn test_parallel_builds_keep_their_own_config() {
        let config_a = serde_json::json!({ "name": "a" });
        let config_b = serde_json::json!({ "name": "b" });
        let (mut build_a, recorder_a) = recorded_build("image-a", config_a.clone());
        let (mut build_b, recorder_b) = recorded_build("image-b", config_b.clone());
        let ui = Arc::new(CaptureUi::new());

        build_a.prepare().unwrap();
        build_b.prepare().unwrap();

        thread::scope(|s| {
            let ui_a = Arc::clone(&ui);
            let ui_b = Arc::clone(&ui);
            let build_a = &build_a;
            let build_b = &build_b;
            s.spawn(move || build_a.run(&ui_a).unwrap());
            s.spawn(move || build_b.run(&ui_b).unwrap());
        });

        assert_eq!(
            recorder_a.calls(),
            vec![
                Call::Prepare(config_a),
                Call::Run {
                    build: "image-a".to_string()
                }
            ]
        );
        assert_eq!(
            recorder_b.calls(),
            vec![
                Call::Prepare(config_b),
                Call::Run {
                    build: "image-b".to_string()
                }
            ]
        );
        assert_eq!(ui.messages().len(), 2);
    }

    #[test]
    fn test_build_trait_object() {
        let (build, recorder) = recorded_build("image-h", serde_json::json!({}));
        let mut boxed: Box<dyn Build> = Box::new(build);

        boxed.prepare().unwrap();
        boxed.run(&CaptureUi::new()).unwrap();

        assert_eq!(boxed.name(), "image-h");
        assert_eq!(recorder.run_count(), 1);
    }

    #[test]
    fn test_handle_exposes_name() {
        let handle = BuildHandle::new("image-i");
        assert_eq!(handle.name(), "image-i");
    }
}
