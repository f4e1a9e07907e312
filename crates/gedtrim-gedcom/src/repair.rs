//! Structural pre-repair for damaged GEDCOM files
//!
//! Some exporters (Family Tree Maker among them) emit CONC/CONT
//! continuation lines at the wrong level, which breaks record grouping.
//! A continuation must sit one level below the line it continues; this
//! pass rewrites any that do not, leaving everything else byte-identical.

/// Fix CONC/CONT levels. Returns the corrected text and whether anything
/// changed.
pub fn fix_continuation_levels(input: &str) -> (String, bool) {
    let mut output = String::with_capacity(input.len());
    let mut expected_level: Option<u8> = None;
    let mut changed = false;

    for raw in input.lines() {
        let Some((level, tag, rest)) = split_level_tag(raw) else {
            output.push_str(raw);
            output.push('\n');
            continue;
        };

        if tag == "CONC" || tag == "CONT" {
            let fixed = expected_level.unwrap_or(level);
            if fixed != level {
                changed = true;
            }
            output.push_str(&format!("{fixed} {tag}{rest}\n"));
        } else {
            expected_level = Some(level.saturating_add(1));
            output.push_str(raw);
            output.push('\n');
        }
    }

    (output, changed)
}

/// Split a raw line into (level, tag, remainder), skipping an optional
/// xref between the two. Returns None for lines that do not look like
/// GEDCOM at all; those are passed through untouched.
fn split_level_tag(raw: &str) -> Option<(u8, &str, &str)> {
    let (level_str, rest) = raw.split_once(' ')?;
    let level: u8 = level_str.parse().ok()?;
    let rest = if rest.starts_with('@') {
        rest.split_once(' ')?.1
    } else {
        rest
    };
    let (tag, remainder) = match rest.split_once(' ') {
        Some((tag, value)) => (tag, &raw[raw.len() - value.len() - 1..]),
        None => (rest, ""),
    };
    Some((level, tag, remainder))
}
