//! `drydock builders` command

use anyhow::Result;

use drydock::BuilderRegistry;

pub fn execute() -> Result<()> {
    let registry = BuilderRegistry::new();

    println!("Builders:");
    println!();

    for entry in registry.entries() {
        println!("  {:<8} {}", entry.name, entry.description);
    }

    Ok(())
}
