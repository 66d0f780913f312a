//! Template command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::domain::TEMPLATE_CSV;

#[derive(Args)]
pub struct TemplateArgs {
    /// Write the template to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: TemplateArgs) -> Result<()> {
    match args.output {
        Some(path) => {
            fs::write(&path, format!("{TEMPLATE_CSV}\n"))
                .with_context(|| format!("Failed to write template: {}", path.display()))?;
            println!("Template written to {}", path.display());
        }
        None => println!("{TEMPLATE_CSV}"),
    }
    Ok(())
}
