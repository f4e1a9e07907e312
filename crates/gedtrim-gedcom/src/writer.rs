//! GEDCOM file writer
//!
//! Emits a graph as a structurally valid GEDCOM 5.5.1 file: a fresh header,
//! every individual and family in insertion order with their opaque payload
//! verbatim, membership lines rebuilt from the reconciled graph, and a
//! trailer. Optionally copies each individual's best photo into a target
//! directory and rewrites the OBJE reference to point there.

use crate::error::GedcomResult;
use gedtrim_core::{Graph, IndividualId};
use std::collections::HashMap;
use std::path::Path;

/// Render a graph as GEDCOM text. `photo_paths` maps individuals to the
/// photo path to embed; individuals absent from the map get no OBJE block.
pub fn render(graph: &Graph, photo_paths: &HashMap<IndividualId, String>) -> String {
    let mut out = String::new();

    out.push_str("0 HEAD\n");
    out.push_str("1 SOUR gedtrim\n");
    out.push_str("1 GEDC\n");
    out.push_str("2 VERS 5.5.1\n");
    out.push_str("2 FORM LINEAGE-LINKED\n");
    out.push_str("1 CHAR UTF-8\n");
    let date = chrono::Local::now().format("%-d %b %Y").to_string();
    out.push_str(&format!("1 DATE {}\n", date.to_uppercase()));

    for individual in graph.individuals() {
        out.push_str(&format!("0 {} INDI\n", individual.id));
        for line in &individual.payload {
            push_payload(&mut out, line.level, &line.tag, line.value.as_deref());
        }
        for family in &individual.spouse_in {
            out.push_str(&format!("1 FAMS {family}\n"));
        }
        for family in &individual.child_in {
            out.push_str(&format!("1 FAMC {family}\n"));
        }
        if let Some(path) = photo_paths.get(&individual.id) {
            out.push_str("1 OBJE\n");
            out.push_str(&format!("2 FILE {path}\n"));
            if let Some(ext) = path.rsplit('.').next().filter(|e| *e != path.as_str()) {
                out.push_str(&format!("2 FORM {}\n", ext.to_lowercase()));
            }
        }
    }

    for family in graph.families() {
        out.push_str(&format!("0 {} FAM\n", family.id));
        let mut husb_seen = false;
        for spouse in &family.spouses {
            let sex = graph.individual(spouse).and_then(|i| i.sex);
            let tag = match sex {
                Some('M') => "HUSB",
                Some('F') => "WIFE",
                _ if !husb_seen => "HUSB",
                _ => "WIFE",
            };
            husb_seen = husb_seen || tag == "HUSB";
            out.push_str(&format!("1 {tag} {spouse}\n"));
        }
        for child in &family.children {
            out.push_str(&format!("1 CHIL {child}\n"));
        }
        for line in &family.payload {
            push_payload(&mut out, line.level, &line.tag, line.value.as_deref());
        }
    }

    out.push_str("0 TRLR\n");
    out
}

fn push_payload(out: &mut String, level: u8, tag: &str, value: Option<&str>) {
    match value {
        Some(value) => out.push_str(&format!("{level} {tag} {value}\n")),
        None => out.push_str(&format!("{level} {tag}\n")),
    }
}

/// Write a graph to `output` as GEDCOM. When `photo_dir` is given, each
/// individual's best photo is copied there and referenced relative to the
/// output file; a photo that cannot be copied is logged and skipped rather
/// than failing the export.
pub fn write_file(graph: &Graph, output: &Path, photo_dir: Option<&Path>) -> GedcomResult<()> {
    let photo_paths = collect_photos(graph, output, photo_dir);
    let text = render(graph, &photo_paths);
    std::fs::write(output, text)?;
    tracing::info!(
        path = %output.display(),
        individuals = graph.individual_count(),
        families = graph.family_count(),
        "wrote GEDCOM file"
    );
    Ok(())
}

fn collect_photos(
    graph: &Graph,
    output: &Path,
    photo_dir: Option<&Path>,
) -> HashMap<IndividualId, String> {
    let mut paths = HashMap::new();
    for individual in graph.individuals() {
        let Some(photo) = individual.best_photo() else {
            continue;
        };
        let Some(dir) = photo_dir else {
            paths.insert(individual.id.clone(), photo.to_string());
            continue;
        };
        match relocate_photo(photo, output, dir) {
            Ok(path) => {
                paths.insert(individual.id.clone(), path);
            }
            Err(err) => {
                tracing::warn!(
                    individual = %individual.id,
                    photo,
                    error = %err,
                    "could not copy photo, dropping its reference"
                );
            }
        }
    }
    paths
}

/// Copy `photo` into `dir` and return the path to embed: relative to the
/// output file's directory when possible, with forward slashes.
fn relocate_photo(photo: &str, output: &Path, dir: &Path) -> std::io::Result<String> {
    std::fs::create_dir_all(dir)?;
    let source = Path::new(photo);
    let file_name = source.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "photo path has no file name")
    })?;
    let target = dir.join(file_name);
    std::fs::copy(source, &target)?;

    let base = output.parent().unwrap_or_else(|| Path::new(""));
    let embedded = target.strip_prefix(base).unwrap_or(&target);
    Ok(embedded
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{parse_str, ReaderOptions};
    use gedtrim_core::{Family, FamilyId, Individual};

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        let mut husband = Individual::new(IndividualId::new("@I1@")).with_name("Arthur /Dent/");
        husband.sex = Some('M');
        husband.add_spouse_in(FamilyId::new("@F1@"));
        husband.payload.push(gedtrim_core::PayloadLine::new(
            1,
            "NAME",
            Some("Arthur /Dent/".to_string()),
        ));

        let mut wife = Individual::new(IndividualId::new("@I2@")).with_name("Trillian /Astra/");
        wife.sex = Some('F');
        wife.add_spouse_in(FamilyId::new("@F1@"));

        let mut child = Individual::new(IndividualId::new("@I3@"));
        child.add_child_in(FamilyId::new("@F1@"));

        let mut family = Family::new(FamilyId::new("@F1@"));
        // wife listed first to prove roles come from SEX, not position
        family.add_spouse(IndividualId::new("@I2@"));
        family.add_spouse(IndividualId::new("@I1@"));
        family.add_child(IndividualId::new("@I3@"));

        graph.insert_individual(husband).unwrap();
        graph.insert_individual(wife).unwrap();
        graph.insert_individual(child).unwrap();
        graph.insert_family(family).unwrap();
        graph
    }

    #[test]
    fn test_render_structure() {
        let text = render(&sample_graph(), &HashMap::new());

        assert!(text.starts_with("0 HEAD\n1 SOUR gedtrim\n"));
        assert!(text.contains("2 VERS 5.5.1\n"));
        assert!(text.contains("1 CHAR UTF-8\n"));
        assert!(text.ends_with("0 TRLR\n"));

        assert!(text.contains("0 @I1@ INDI\n1 NAME Arthur /Dent/\n1 FAMS @F1@\n"));
        assert!(text.contains("1 FAMC @F1@\n"));
    }

    #[test]
    fn test_spouse_roles_from_sex() {
        let text = render(&sample_graph(), &HashMap::new());
        assert!(text.contains("1 WIFE @I2@\n1 HUSB @I1@\n"));
    }

    #[test]
    fn test_photo_block_emitted() {
        let mut photos = HashMap::new();
        photos.insert(IndividualId::new("@I3@"), "photos/random.jpg".to_string());
        let text = render(&sample_graph(), &photos);

        assert!(text.contains("0 @I3@ INDI\n1 FAMC @F1@\n1 OBJE\n2 FILE photos/random.jpg\n2 FORM jpg\n"));
    }

    #[test]
    fn test_output_parses_back() {
        let text = render(&sample_graph(), &HashMap::new());
        let reparsed = parse_str(&text, &ReaderOptions::default()).unwrap();

        assert_eq!(reparsed.individual_count(), 3);
        assert_eq!(reparsed.family_count(), 1);
        let family = reparsed.family(&FamilyId::new("@F1@")).unwrap();
        assert_eq!(family.children, vec![IndividualId::new("@I3@")]);
    }

    #[test]
    fn test_write_file_relocates_photo() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("me.jpg");
        std::fs::write(&photo, b"jpegdata").unwrap();

        let mut graph = sample_graph();
        let child = graph.individual_mut(&IndividualId::new("@I3@")).unwrap();
        child.photos = vec![photo.to_string_lossy().into_owned()];

        let output = dir.path().join("out.ged");
        let photo_dir = dir.path().join("media");
        write_file(&graph, &output, Some(&photo_dir)).unwrap();

        assert!(photo_dir.join("me.jpg").exists());
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("2 FILE media/me.jpg\n"));
    }

    #[test]
    fn test_missing_photo_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = sample_graph();
        let child = graph.individual_mut(&IndividualId::new("@I3@")).unwrap();
        child.photos = vec!["/nonexistent/gone.jpg".to_string()];

        let output = dir.path().join("out.ged");
        write_file(&graph, &output, Some(dir.path().join("media").as_path())).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(!text.contains("OBJE"));
    }
}
