//! Find command: look up individuals by name

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::output::{to_json, OutputFormat};
use crate::Cli;
use gedtrim_gedcom::{read_file, ReaderOptions};

#[derive(Args)]
pub struct FindArgs {
    /// GEDCOM file to search
    pub file: PathBuf,

    /// Name to look for (case-insensitive substring)
    pub name: String,

    /// Require an exact (case-insensitive) match
    #[arg(short, long)]
    pub exact: bool,
}

#[derive(Serialize)]
struct FindMatch {
    id: String,
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sex: Option<char>,
    parent_families: usize,
    spouse_families: usize,
}

pub fn run(args: &FindArgs, cli: &Cli) -> anyhow::Result<()> {
    let graph = read_file(&args.file, &ReaderOptions::default())
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let matches: Vec<FindMatch> = graph
        .find_by_name(&args.name, args.exact)
        .into_iter()
        .map(|i| FindMatch {
            id: i.id.to_string(),
            name: i.name.clone(),
            sex: i.sex,
            parent_families: i.child_in.len(),
            spouse_families: i.spouse_in.len(),
        })
        .collect();

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => println!("{}", to_json(&matches)),
        OutputFormat::Text => {
            if matches.is_empty() {
                println!("No individual matches {:?}", args.name);
            }
            for m in &matches {
                println!("{} {}", m.id, m.name.as_deref().unwrap_or("(unnamed)"));
            }
        }
    }

    Ok(())
}
