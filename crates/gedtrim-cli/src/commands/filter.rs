//! Filter command: the core trim operation

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::output::{to_json, OutputFormat};
use crate::Cli;
use gedtrim_core::{prune, FilterEngine, FilterQuery, Graph, IndividualId, WiderDescendants};
use gedtrim_gedcom::{read_file, write_file, ReaderOptions};

#[derive(Args)]
pub struct FilterArgs {
    /// GEDCOM file to filter
    pub file: PathBuf,

    /// Xref of the starting individual (e.g. @I123@)
    #[arg(long, value_name = "XREF")]
    pub start_id: Option<String>,

    /// Name of the starting individual (case-insensitive; exact match
    /// preferred, substring as fallback; must match exactly one person)
    #[arg(long, value_name = "NAME", conflicts_with = "start_id")]
    pub start_name: Option<String>,

    /// Ancestor generations to keep (negative = unlimited)
    #[arg(short, long, default_value_t = 2, allow_negative_numbers = true)]
    pub ancestors: i32,

    /// Descendant generations to keep (negative = unlimited)
    #[arg(short, long, default_value_t = 2, allow_negative_numbers = true)]
    pub descendants: i32,

    /// Also keep descendants of kept ancestors (aunts/uncles, cousins)
    #[arg(short, long, value_enum, default_value_t = WiderArg::None)]
    pub wider: WiderArg,

    /// Keep partners of everyone kept
    #[arg(short, long)]
    pub partners: bool,

    /// Keep siblings of everyone kept
    #[arg(short, long)]
    pub siblings: bool,

    /// Output file (defaults to <input-stem>_filtered.ged in the output folder)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Folder for the output file when --output is not given
    #[arg(long, default_value = "output")]
    pub output_folder: PathBuf,

    /// Copy kept photos into this directory and rewrite their references
    #[arg(long, value_name = "DIR")]
    pub photo_dir: Option<PathBuf>,

    /// Only use _PHOTO records for photos, ignoring OBJE records
    #[arg(long)]
    pub only_photo_tags: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WiderArg {
    /// Do not follow ancestors' wider lines
    None,
    /// Follow them down to just above the start's generation
    Start,
    /// Follow them as deep as the descendant walk goes
    Deep,
}

impl From<WiderArg> for WiderDescendants {
    fn from(w: WiderArg) -> Self {
        match w {
            WiderArg::None => WiderDescendants::None,
            WiderArg::Start => WiderDescendants::Start,
            WiderArg::Deep => WiderDescendants::Deep,
        }
    }
}

#[derive(Serialize)]
struct FilterSummary {
    input: String,
    output: String,
    start_id: String,
    start_name: Option<String>,
    individuals_before: usize,
    individuals_after: usize,
    families_before: usize,
    families_after: usize,
    earliest_generation: i32,
    latest_generation: i32,
    degenerate: bool,
}

/// Resolve the starting individual from --start-id or --start-name.
/// A name must identify exactly one person; ambiguity is fatal and lists
/// the candidates so the user can rerun with an xref.
fn resolve_start(graph: &Graph, args: &FilterArgs) -> anyhow::Result<IndividualId> {
    if let Some(id) = &args.start_id {
        return Ok(IndividualId::new(id.clone()));
    }
    let Some(name) = &args.start_name else {
        bail!("either --start-id or --start-name is required");
    };

    let mut matches = graph.find_by_name(name, true);
    if matches.is_empty() {
        matches = graph.find_by_name(name, false);
    }
    match matches.len() {
        0 => bail!("no individual matches name {name:?}"),
        1 => Ok(matches[0].id.clone()),
        n => {
            let candidates: Vec<String> = matches
                .iter()
                .map(|i| format!("  {} {}", i.id, i.display_name()))
                .collect();
            bail!(
                "name {name:?} matches {n} individuals, use --start-id instead:\n{}",
                candidates.join("\n")
            )
        }
    }
}

fn output_path(args: &FilterArgs) -> PathBuf {
    if let Some(output) = &args.output {
        return output.clone();
    }
    let stem = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "filtered".to_string());
    args.output_folder.join(format!("{stem}_filtered.ged"))
}

pub fn run(args: &FilterArgs, cli: &Cli) -> anyhow::Result<()> {
    let options = ReaderOptions {
        only_photo_tags: args.only_photo_tags,
    };
    let graph = read_file(&args.file, &options)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let start = resolve_start(&graph, args)?;
    let query = FilterQuery::new(start)
        .with_ancestor_generations(args.ancestors)
        .with_descendant_generations(args.descendants)
        .with_wider_descendants(args.wider.into())
        .with_partners(args.partners)
        .with_siblings(args.siblings);

    let result = FilterEngine::run(&graph, &query)?;
    if result.stats.degenerate {
        tracing::warn!("result contains only the starting individual");
    }

    let trimmed = prune(&graph, &result);

    let output = output_path(args);
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    write_file(&trimmed, &output, args.photo_dir.as_deref())
        .with_context(|| format!("failed to write {}", output.display()))?;

    let start_name = graph
        .individual(&query.start)
        .and_then(|i| i.name.clone());
    let summary = FilterSummary {
        input: args.file.display().to_string(),
        output: output.display().to_string(),
        start_id: query.start.to_string(),
        start_name,
        individuals_before: graph.individual_count(),
        individuals_after: trimmed.individual_count(),
        families_before: graph.family_count(),
        families_after: trimmed.family_count(),
        earliest_generation: result.stats.earliest_generation,
        latest_generation: result.stats.latest_generation,
        degenerate: result.stats.degenerate,
    };

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => println!("{}", to_json(&summary)),
        OutputFormat::Text => {
            println!(
                "Kept {} of {} individuals and {} of {} families",
                summary.individuals_after,
                summary.individuals_before,
                summary.families_after,
                summary.families_before
            );
            println!(
                "Generations {} to {} around {}",
                summary.earliest_generation,
                summary.latest_generation,
                summary
                    .start_name
                    .as_deref()
                    .unwrap_or(summary.start_id.as_str())
            );
            if summary.degenerate {
                println!("Warning: only the starting individual was kept");
            }
            println!("Wrote {}", summary.output);
        }
    }

    Ok(())
}
