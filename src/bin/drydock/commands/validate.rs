//! `drydock validate` command

use anyhow::Result;

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::commands::{current_config, make_shell};
use drydock::ops::{validate, Template};
use drydock::BuilderRegistry;

pub fn execute(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let config = current_config()?;
    let shell = make_shell(global, &config)?;

    let template = Template::load(&args.template)?;
    validate(&template, &BuilderRegistry::new(), &shell)?;

    Ok(())
}
