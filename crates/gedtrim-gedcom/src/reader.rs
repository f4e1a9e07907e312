//! GEDCOM file reader
//!
//! Parses INDI and FAM records into a [`Graph`], keeping every sub-line
//! the traversal engine does not interpret as opaque payload so the writer
//! can re-emit it verbatim. Cross-references are completed in both
//! directions and validated: a reference to a record absent from the file
//! fails the whole load.

use crate::error::{GedcomError, GedcomResult};
use crate::line::Line;
use crate::repair;
use gedtrim_core::{Error, Family, FamilyId, Graph, Individual, IndividualId, PayloadLine};
use std::path::Path;

/// Photo file extensions worth exporting
const PHOTO_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "bmp", "png", "gif"];

/// Reader options
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    /// Only use `_PHOTO` records for photos, ignoring OBJE records
    pub only_photo_tags: bool,
}

/// Read and parse a GEDCOM file into a graph
pub fn read_file(path: &Path, options: &ReaderOptions) -> GedcomResult<Graph> {
    tracing::debug!(path = %path.display(), "reading GEDCOM file");
    let bytes = std::fs::read(path)?;
    let text = decode(bytes);
    parse_str(&text, options)
}

/// UTF-8 first, latin-1 as the fallback some older exporters need
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("input is not valid UTF-8, decoding as latin-1");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

/// Parse GEDCOM text into a graph
pub fn parse_str(text: &str, options: &ReaderOptions) -> GedcomResult<Graph> {
    let (text, repaired) = repair::fix_continuation_levels(text);
    if repaired {
        tracing::warn!("corrected CONC/CONT levels in input");
    }

    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        lines.push(Line::parse(raw, index + 1)?);
    }

    let mut graph = Graph::new();
    let mut index = 0;
    while index < lines.len() {
        let end = record_end(&lines, index);
        let opener = &lines[index];
        if opener.level == 0 {
            match (opener.tag.as_str(), opener.xref.as_ref()) {
                ("INDI", Some(xref)) => {
                    let individual =
                        build_individual(xref, &lines[index + 1..end], options);
                    graph.insert_individual(individual)?;
                }
                ("FAM", Some(xref)) => {
                    let family = build_family(xref, &lines[index + 1..end])?;
                    graph.insert_family(family)?;
                }
                // HEAD, TRLR, SUBM, top-level NOTE/OBJE/SOUR records
                _ => {}
            }
        }
        index = end;
    }

    complete_links(&mut graph)?;

    tracing::info!(
        individuals = graph.individual_count(),
        families = graph.family_count(),
        "parsed GEDCOM"
    );
    Ok(graph)
}

/// Index one past the last line of the record starting at `start`
fn record_end(lines: &[Line], start: usize) -> usize {
    let level = lines[start].level;
    lines[start + 1..]
        .iter()
        .position(|line| line.level <= level)
        .map_or(lines.len(), |offset| start + 1 + offset)
}

fn build_individual(xref: &str, body: &[Line], options: &ReaderOptions) -> Individual {
    let mut individual = Individual::new(IndividualId::new(xref));
    let mut photos: Vec<String> = Vec::new();
    let mut preferred: Vec<String> = Vec::new();

    let mut index = 0;
    while index < body.len() {
        let end = record_end(body, index);
        let line = &body[index];
        match line.tag.as_str() {
            "FAMC" => {
                if let Some(value) = &line.value {
                    individual.add_child_in(FamilyId::new(value.clone()));
                }
            }
            "FAMS" => {
                if let Some(value) = &line.value {
                    individual.add_spouse_in(FamilyId::new(value.clone()));
                }
            }
            "_PHOTO" => {
                let (files, _) = extract_photos(&body[index..end]);
                preferred.extend(files);
            }
            "OBJE" if !options.only_photo_tags => {
                let (files, marked) = extract_photos(&body[index..end]);
                photos.extend(files);
                preferred.extend(marked);
            }
            tag => {
                if tag == "NAME" && individual.name.is_none() {
                    individual.name = line.value.clone();
                }
                if tag == "SEX" {
                    individual.sex = line.value.as_ref().and_then(|v| v.chars().next());
                }
                // Everything not interpreted travels through as payload
                for kept in &body[index..end] {
                    individual.payload.push(PayloadLine::new(
                        kept.level,
                        kept.tag.clone(),
                        kept.value.clone(),
                    ));
                }
            }
        }
        index = end;
    }

    individual.primary_photo = preferred.into_iter().next();
    individual.photos = photos;
    individual
}

fn build_family(xref: &str, body: &[Line]) -> GedcomResult<Family> {
    let mut family = Family::new(FamilyId::new(xref));

    let mut index = 0;
    while index < body.len() {
        let end = record_end(body, index);
        let line = &body[index];
        match line.tag.as_str() {
            "HUSB" | "WIFE" => {
                let value = line.value.as_ref().ok_or_else(|| {
                    GedcomError::Record(format!("{xref}: {} without a pointer", line.tag))
                })?;
                family.add_spouse(IndividualId::new(value.clone()));
            }
            "CHIL" => {
                let value = line.value.as_ref().ok_or_else(|| {
                    GedcomError::Record(format!("{xref}: CHIL without a pointer"))
                })?;
                family.add_child(IndividualId::new(value.clone()));
            }
            _ => {
                for kept in &body[index..end] {
                    family.payload.push(PayloadLine::new(
                        kept.level,
                        kept.tag.clone(),
                        kept.value.clone(),
                    ));
                }
            }
        }
        index = end;
    }
    Ok(family)
}

/// Pull photo file paths out of an OBJE or _PHOTO block.
/// Returns (all valid files, files marked preferred via _PRIM).
fn extract_photos(block: &[Line]) -> (Vec<String>, Vec<String>) {
    let mut files = Vec::new();
    let mut preferred = Vec::new();

    let file = block.iter().find(|line| line.tag == "FILE");
    let Some(file_value) = file.and_then(|line| line.value.clone()) else {
        return (files, preferred);
    };

    let extension = file_value
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let form_ok = block.iter().any(|line| {
        line.tag == "FORM"
            && line
                .value
                .as_ref()
                .is_some_and(|v| PHOTO_EXTENSIONS.contains(&v.to_lowercase().as_str()))
    });
    if !PHOTO_EXTENSIONS.contains(&extension.as_str()) && !form_ok {
        return (files, preferred);
    }

    let primary = block.iter().any(|line| {
        line.tag == "_PRIM" && line.value.as_deref().is_some_and(|v| !v.eq_ignore_ascii_case("n"))
    });
    if primary {
        preferred.push(file_value.clone());
    }
    files.push(file_value);
    (files, preferred)
}

/// Complete membership links in both directions and validate that every
/// cross-reference resolves. GEDCOM files carry both FAMS/FAMC and
/// HUSB/WIFE/CHIL; either side alone is enough to establish the link.
fn complete_links(graph: &mut Graph) -> GedcomResult<()> {
    let mut spouse_links: Vec<(FamilyId, IndividualId)> = Vec::new();
    let mut child_links: Vec<(FamilyId, IndividualId)> = Vec::new();
    for family in graph.families() {
        for spouse in &family.spouses {
            spouse_links.push((family.id.clone(), spouse.clone()));
        }
        for child in &family.children {
            child_links.push((family.id.clone(), child.clone()));
        }
    }

    for (family_id, spouse) in spouse_links {
        let individual = graph.individual_mut(&spouse).ok_or_else(|| {
            Error::MalformedReference {
                from: family_id.to_string(),
                to: spouse.to_string(),
            }
        })?;
        individual.add_spouse_in(family_id);
    }
    for (family_id, child) in child_links {
        let individual = graph.individual_mut(&child).ok_or_else(|| {
            Error::MalformedReference {
                from: family_id.to_string(),
                to: child.to_string(),
            }
        })?;
        individual.add_child_in(family_id);
    }

    // And the reverse: FAMS/FAMC claims made by individuals
    let mut famc_links: Vec<(IndividualId, FamilyId)> = Vec::new();
    let mut fams_links: Vec<(IndividualId, FamilyId)> = Vec::new();
    for individual in graph.individuals() {
        for family in &individual.child_in {
            famc_links.push((individual.id.clone(), family.clone()));
        }
        for family in &individual.spouse_in {
            fams_links.push((individual.id.clone(), family.clone()));
        }
    }

    for (individual_id, family_id) in famc_links {
        let family = graph.family_mut(&family_id).ok_or_else(|| {
            Error::MalformedReference {
                from: individual_id.to_string(),
                to: family_id.to_string(),
            }
        })?;
        family.add_child(individual_id);
    }
    for (individual_id, family_id) in fams_links {
        let family = graph.family_mut(&family_id).ok_or_else(|| {
            Error::MalformedReference {
                from: individual_id.to_string(),
                to: family_id.to_string(),
            }
        })?;
        family.add_spouse(individual_id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
0 HEAD
1 SOUR test
0 @I1@ INDI
1 NAME Arthur /Dent/
1 SEX M
1 BIRT
2 DATE 1 JAN 1900
2 PLAC Cottington
1 FAMS @F1@
0 @I2@ INDI
1 NAME Trillian /Astra/
1 SEX F
1 FAMS @F1@
0 @I3@ INDI
1 NAME Random /Dent/
1 FAMC @F1@
1 OBJE
2 FILE photos/random.jpg
2 _PRIM Y
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 CHIL @I3@
1 MARR
2 DATE 2 FEB 1920
0 TRLR
";

    #[test]
    fn test_parse_counts_and_names() {
        let graph = parse_str(SAMPLE, &ReaderOptions::default()).unwrap();
        assert_eq!(graph.individual_count(), 3);
        assert_eq!(graph.family_count(), 1);

        let arthur = graph.individual(&IndividualId::new("@I1@")).unwrap();
        assert_eq!(arthur.name.as_deref(), Some("Arthur /Dent/"));
        assert_eq!(arthur.sex, Some('M'));
    }

    #[test]
    fn test_links_completed_both_ways() {
        let graph = parse_str(SAMPLE, &ReaderOptions::default()).unwrap();

        let family = graph.family(&FamilyId::new("@F1@")).unwrap();
        assert_eq!(
            family.spouses,
            vec![IndividualId::new("@I1@"), IndividualId::new("@I2@")]
        );
        assert_eq!(family.children, vec![IndividualId::new("@I3@")]);

        let child = graph.individual(&IndividualId::new("@I3@")).unwrap();
        assert_eq!(child.child_in, vec![FamilyId::new("@F1@")]);

        let parents = graph.parents_of(&IndividualId::new("@I3@")).unwrap();
        assert_eq!(parents.len(), 2);
    }

    #[test]
    fn test_payload_preserved_verbatim() {
        let graph = parse_str(SAMPLE, &ReaderOptions::default()).unwrap();
        let arthur = graph.individual(&IndividualId::new("@I1@")).unwrap();

        let tags: Vec<&str> = arthur.payload.iter().map(|l| l.tag.as_str()).collect();
        assert_eq!(tags, vec!["NAME", "SEX", "BIRT", "DATE", "PLAC"]);

        let family = graph.family(&FamilyId::new("@F1@")).unwrap();
        let tags: Vec<&str> = family.payload.iter().map(|l| l.tag.as_str()).collect();
        assert_eq!(tags, vec!["MARR", "DATE"]);
    }

    #[test]
    fn test_photo_extracted() {
        let graph = parse_str(SAMPLE, &ReaderOptions::default()).unwrap();
        let random = graph.individual(&IndividualId::new("@I3@")).unwrap();

        assert_eq!(random.photos, vec!["photos/random.jpg"]);
        assert_eq!(random.primary_photo.as_deref(), Some("photos/random.jpg"));
        assert_eq!(random.best_photo(), Some("photos/random.jpg"));
    }

    #[test]
    fn test_only_photo_tags_ignores_obje() {
        let options = ReaderOptions {
            only_photo_tags: true,
        };
        let graph = parse_str(SAMPLE, &options).unwrap();
        let random = graph.individual(&IndividualId::new("@I3@")).unwrap();
        assert!(random.photos.is_empty());
        assert!(random.primary_photo.is_none());
    }

    #[test]
    fn test_non_photo_extension_skipped() {
        let text = "\
0 @I1@ INDI
1 OBJE
2 FILE docs/will.pdf
0 TRLR
";
        let graph = parse_str(text, &ReaderOptions::default()).unwrap();
        let indi = graph.individual(&IndividualId::new("@I1@")).unwrap();
        assert!(indi.photos.is_empty());
    }

    #[test]
    fn test_dangling_reference_fails_load() {
        let text = "\
0 @I1@ INDI
1 NAME Orphan /Record/
0 @F1@ FAM
1 HUSB @I1@
1 CHIL @I9@
0 TRLR
";
        let err = parse_str(text, &ReaderOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GedcomError::Graph(Error::MalformedReference { .. })
        ));
    }

    #[test]
    fn test_latin1_fallback() {
        let mut bytes = b"0 @I1@ INDI\n1 NAME Ren".to_vec();
        bytes.push(0xE9); // é in latin-1, invalid as a lone UTF-8 byte
        bytes.extend_from_slice(b" /Dupont/\n0 TRLR\n");
        let text = decode(bytes);
        assert!(text.contains("Ren\u{e9} /Dupont/"));
    }
}
