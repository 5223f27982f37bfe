//! Implementation of `drydock validate`.
//!
//! Runs the prepare phase of every build in a template and stops there.
//! Builders do no external work while preparing, so this is safe to run
//! anywhere.

use anyhow::Result;

use crate::builders::BuilderRegistry;
use crate::core::build::Build;
use crate::ops::drydock_build::{create_builds, prepare_builds};
use crate::ops::template::Template;
use crate::util::shell::{Shell, Status};

/// Validate a template. Returns the names of the builds that were checked.
pub fn validate(template: &Template, registry: &BuilderRegistry, shell: &Shell) -> Result<Vec<String>> {
    template.validate(registry)?;

    let specs: Vec<_> = template.builds().iter().collect();
    let mut builds = create_builds(registry, &specs)?;
    prepare_builds(&mut builds, shell)?;

    let names: Vec<String> = builds.iter().map(|b| b.name().to_string()).collect();
    shell.status(
        Status::Validated,
        format!("{} ({} build(s))", template.path().display(), names.len()),
    );

    Ok(names)
}
