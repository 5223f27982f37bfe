//! Output sinks for build progress.
//!
//! A [`Ui`] is handed to a build when it runs and passed through untouched to
//! the builder. Builds may run on many threads at once, so every sink must be
//! `Send + Sync` and must write each message as one unit.

use std::sync::Arc;

use crate::core::events::BuildEvent;
use crate::util::shell::{Shell, Status};

/// A write-only destination for human-readable progress messages.
pub trait Ui: Send + Sync {
    /// Emit one message.
    fn say(&self, message: &str);
}

impl<T: Ui + ?Sized> Ui for &T {
    fn say(&self, message: &str) {
        (**self).say(message)
    }
}

impl<T: Ui + ?Sized> Ui for Box<T> {
    fn say(&self, message: &str) {
        (**self).say(message)
    }
}

impl<T: Ui + ?Sized> Ui for Arc<T> {
    fn say(&self, message: &str) {
        (**self).say(message)
    }
}

/// Sink that writes through the shared [`Shell`].
///
/// Human mode prints a `Building` status line; JSON mode emits a
/// `build-message` event.
#[derive(Debug, Clone)]
pub struct ShellUi {
    shell: Arc<Shell>,
}

impl ShellUi {
    pub fn new(shell: Arc<Shell>) -> Self {
        ShellUi { shell }
    }

    pub fn shell(&self) -> &Arc<Shell> {
        &self.shell
    }
}

impl Ui for ShellUi {
    fn say(&self, message: &str) {
        if self.shell.is_json() {
            self.shell.emit(&BuildEvent::Message {
                message: message.to_string(),
            });
        } else {
            self.shell.status(Status::Building, message);
        }
    }
}

/// Sink that tags every message with a prefix, usually the build name.
///
/// With several builds writing to one terminal the prefix is what tells
/// their lines apart.
#[derive(Debug, Clone)]
pub struct PrefixedUi<U> {
    prefix: String,
    inner: U,
}

impl<U: Ui> PrefixedUi<U> {
    pub fn new(prefix: impl Into<String>, inner: U) -> Self {
        PrefixedUi {
            prefix: prefix.into(),
            inner,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<U: Ui> Ui for PrefixedUi<U> {
    fn say(&self, message: &str) {
        // Format first so the inner sink gets a single call per message.
        let line = format!("{}: {}", self.prefix, message);
        self.inner.say(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CaptureUi;
    use crate::util::shell::ShellMode;

    #[test]
    fn test_prefixed_ui_tags_messages() {
        let capture = CaptureUi::new();
        let ui = PrefixedUi::new("image-a", &capture);

        ui.say("booting");
        ui.say("done");

        assert_eq!(capture.messages(), vec!["image-a: booting", "image-a: done"]);
        assert_eq!(ui.prefix(), "image-a");
    }

    #[test]
    fn test_nested_prefixes() {
        let capture = CaptureUi::new();
        let ui = PrefixedUi::new("outer", PrefixedUi::new("inner", &capture));

        ui.say("x");

        assert_eq!(capture.messages(), vec!["inner: outer: x"]);
    }

    #[test]
    fn test_ui_through_smart_pointers() {
        let capture = Arc::new(CaptureUi::new());
        let boxed: Box<dyn Ui> = Box::new(Arc::clone(&capture));

        boxed.say("via box");
        Arc::clone(&capture).say("via arc");

        assert_eq!(capture.messages(), vec!["via box", "via arc"]);
    }

    #[test]
    fn test_shell_ui_json_mode_emits_event() {
        let shell = Arc::new(Shell::new(ShellMode::Json));
        let ui = ShellUi::new(Arc::clone(&shell));

        ui.say("hello");

        let lines = shell.json_lines();
        assert_eq!(lines.len(), 1);
        let event: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(event["reason"], "build-message");
        assert_eq!(event["message"], "hello");
    }
}
