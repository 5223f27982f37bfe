//! `drydock build` command

use anyhow::Result;

use crate::cli::{BuildArgs, GlobalOpts};
use crate::commands::{current_config, make_shell};
use drydock::ops::drydock_build::{build, BuildOptions};
use drydock::ops::Template;
use drydock::util::Status;
use drydock::BuilderRegistry;

pub fn execute(args: BuildArgs, global: &GlobalOpts) -> Result<()> {
    let config = current_config()?;
    let shell = make_shell(global, &config)?;

    let template = Template::load(&args.template)?;
    let registry = BuilderRegistry::new();

    // CLI > config > default
    let opts = BuildOptions {
        only: args.only,
        except: args.except,
        parallel: args.parallel.unwrap_or_else(|| config.parallel()),
        jobs: args.jobs.or(config.build.jobs),
    };

    let report = build(&template, &registry, &shell, &opts)?;

    let succeeded: Vec<_> = report.succeeded().collect();
    if !succeeded.is_empty() {
        shell.status(
            Status::Finished,
            format!("{} build(s): {}", succeeded.len(), succeeded.join(", ")),
        );
    }

    report.into_result()?;
    Ok(())
}
