//! GEDCOM line model
//!
//! Every GEDCOM line is `LEVEL [@XREF@] TAG [VALUE]`. The xref appears only
//! on level-0 record openers; the value keeps its internal spacing.

use crate::error::{GedcomError, GedcomResult};

/// A single tokenized GEDCOM line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub level: u8,
    pub xref: Option<String>,
    pub tag: String,
    pub value: Option<String>,
}

impl Line {
    /// Tokenize one raw line. `line_no` is 1-based and only used for error
    /// reporting.
    pub fn parse(raw: &str, line_no: usize) -> GedcomResult<Self> {
        let fail = || GedcomError::Line {
            line_no,
            content: raw.to_string(),
        };

        let trimmed = raw.trim_start().trim_end_matches(['\r', '\n']);
        let (level_str, rest) = trimmed.split_once(' ').ok_or_else(fail)?;
        let level: u8 = level_str.parse().map_err(|_| fail())?;
        let rest = rest.trim_start();

        let (xref, rest) = if rest.starts_with('@') {
            match rest.split_once(' ') {
                Some((xref, tail)) => (Some(xref.to_string()), tail.trim_start()),
                None => return Err(fail()),
            }
        } else {
            (None, rest)
        };

        let (tag, value) = match rest.split_once(' ') {
            Some((tag, value)) if !value.is_empty() => (tag.to_string(), Some(value.to_string())),
            Some((tag, _)) => (tag.to_string(), None),
            None => (rest.to_string(), None),
        };
        if tag.is_empty() {
            return Err(fail());
        }

        Ok(Self {
            level,
            xref,
            tag,
            value,
        })
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level)?;
        if let Some(ref xref) = self.xref {
            write!(f, " {xref}")?;
        }
        write!(f, " {}", self.tag)?;
        if let Some(ref value) = self.value {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_opener() {
        let line = Line::parse("0 @I1@ INDI", 1).unwrap();
        assert_eq!(line.level, 0);
        assert_eq!(line.xref.as_deref(), Some("@I1@"));
        assert_eq!(line.tag, "INDI");
        assert!(line.value.is_none());
    }

    #[test]
    fn test_parse_value_keeps_spacing() {
        let line = Line::parse("1 NAME Arthur  Philip /Dent/", 1).unwrap();
        assert_eq!(line.tag, "NAME");
        assert_eq!(line.value.as_deref(), Some("Arthur  Philip /Dent/"));
    }

    #[test]
    fn test_parse_bare_tag() {
        let line = Line::parse("0 TRLR", 1).unwrap();
        assert_eq!(line.tag, "TRLR");
        assert!(line.xref.is_none());
        assert!(line.value.is_none());
    }

    #[test]
    fn test_parse_pointer_value() {
        let line = Line::parse("1 FAMC @F12@", 3).unwrap();
        assert_eq!(line.tag, "FAMC");
        assert_eq!(line.value.as_deref(), Some("@F12@"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Line::parse("", 1).is_err());
        assert!(Line::parse("notalevel NAME x", 2).is_err());

        let err = Line::parse("@I1@", 9).unwrap_err();
        assert!(matches!(err, GedcomError::Line { line_no: 9, .. }));
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["0 @I1@ INDI", "1 NAME Arthur /Dent/", "0 TRLR", "2 DATE 1 JAN 1900"] {
            let line = Line::parse(raw, 1).unwrap();
            assert_eq!(line.to_string(), raw);
        }
    }
}
