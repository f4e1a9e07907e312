//! Info command: summarize a GEDCOM file

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::output::{to_json, OutputFormat};
use crate::Cli;
use gedtrim_gedcom::{read_file, ReaderOptions};

#[derive(Args)]
pub struct InfoArgs {
    /// GEDCOM file to inspect
    pub file: PathBuf,
}

#[derive(Serialize)]
struct FileInfo {
    file: String,
    individuals: usize,
    families: usize,
    individuals_with_photos: usize,
    unnamed_individuals: usize,
}

pub fn run(args: &InfoArgs, cli: &Cli) -> anyhow::Result<()> {
    let graph = read_file(&args.file, &ReaderOptions::default())
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let info = FileInfo {
        file: args.file.display().to_string(),
        individuals: graph.individual_count(),
        families: graph.family_count(),
        individuals_with_photos: graph
            .individuals()
            .filter(|i| i.best_photo().is_some())
            .count(),
        unnamed_individuals: graph.individuals().filter(|i| i.name.is_none()).count(),
    };

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => println!("{}", to_json(&info)),
        OutputFormat::Text => {
            println!("{}", info.file);
            println!("  individuals: {}", info.individuals);
            println!("  families:    {}", info.families);
            println!("  with photos: {}", info.individuals_with_photos);
            println!("  unnamed:     {}", info.unnamed_individuals);
        }
    }

    Ok(())
}
