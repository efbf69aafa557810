//! Print the effective settings

use folder_index::{Result, VaultContext};

pub fn run(ctx: &VaultContext) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ctx.settings).unwrap_or_default());
    } else {
        print!("{}", ctx.settings.to_yaml()?);
    }
    Ok(())
}
