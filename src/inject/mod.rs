//! Fragment injection: merging generated regions into hand-maintained artifacts.
//!
//! Merging is a pure function over strings ([`replace_region`]); [`file`] is the thin
//! filesystem boundary that reads, scaffolds and atomically rewrites artifacts.

pub mod file;

pub use file::{inject, read_artifact, write_atomic, InjectOutcome};

use std::path::{Component, Path};

use crate::error::InjectError;

/// Label of the region owned by the generator in the default plan.
pub const DEFAULT_LABEL: &str = "generated code";

/// Banner written at the top of an artifact that does not exist yet.
/// `FILENAME` is replaced by the artifact's include path.
const HEADER_TEMPLATE: &str = "\
// Author(s): Wieger Wesselink
// Copyright: see the accompanying file COPYING or copy at
// https://svn.win.tue.nl/trac/MCRL2/browser/trunk/COPYING
//
// Distributed under the Boost Software License, Version 1.0.
// (See accompanying file LICENSE_1_0.txt or copy at
// http://www.boost.org/LICENSE_1_0.txt)
//
/// \\file FILENAME
/// \\brief The content of this file is included in other header
/// files, to prevent duplication.
";

pub fn start_marker(label: &str) -> String {
    format!("//--- start {} ---//", label)
}

pub fn end_marker(label: &str) -> String {
    format!("//--- end {} ---//", label)
}

/// Name an artifact is included by: the part of `path` after its last `include`
/// component, or the whole relative path when there is none.
pub fn include_name(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let start = parts
        .iter()
        .rposition(|part| part == "include")
        .map(|i| i + 1)
        .unwrap_or(0);
    parts[start..].join("/")
}

/// Initial text of a new artifact: header banner plus one empty region per distinct label.
pub fn scaffold<'a, I>(path: &Path, labels: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut text = HEADER_TEMPLATE.replace("FILENAME", &include_name(path));
    let mut seen = Vec::new();
    for label in labels {
        if seen.contains(&label) {
            continue;
        }
        seen.push(label);
        text.push('\n');
        text.push_str(&start_marker(label));
        text.push('\n');
        text.push_str(&end_marker(label));
        text.push('\n');
    }
    text
}

fn find_unique(text: &str, marker: &str) -> Result<usize, InjectError> {
    let positions: Vec<usize> = text.match_indices(marker).map(|(i, _)| i).collect();
    match positions.as_slice() {
        [position] => Ok(*position),
        [] => Err(InjectError::MissingMarker {
            marker: marker.to_string(),
        }),
        _ => Err(InjectError::DuplicateMarker {
            marker: marker.to_string(),
            count: positions.len(),
        }),
    }
}

/// Replaces the lines strictly between the start and end marker lines of `label` with
/// `generated`, leaving every other byte of `existing` untouched.
///
/// Region text is newline-terminated unless empty. Replacing a region with its current
/// content returns `existing` unchanged.
pub fn replace_region(existing: &str, label: &str, generated: &str) -> Result<String, InjectError> {
    let start_text = start_marker(label);
    let start = find_unique(existing, &start_text)?;
    let end = find_unique(existing, &end_marker(label))?;
    if end < start {
        return Err(InjectError::MisorderedMarkers {
            label: label.to_string(),
        });
    }

    let (region_start, region_end, needs_newline) = match existing[start..end].find('\n') {
        // The region runs from after the start marker's line to where the end marker's
        // line begins.
        Some(offset) => {
            let region_start = start + offset + 1;
            let region_end = existing[region_start..end]
                .rfind('\n')
                .map(|offset| region_start + offset + 1)
                .unwrap_or(region_start);
            (region_start, region_end, false)
        }
        // Both markers on one line: everything between them belongs to the region.
        None => (start + start_text.len(), end, true),
    };

    let mut merged = String::with_capacity(existing.len() + generated.len() + 2);
    merged.push_str(&existing[..region_start]);
    if needs_newline {
        merged.push('\n');
    }
    merged.push_str(generated);
    if !generated.is_empty() && !generated.ends_with('\n') {
        merged.push('\n');
    }
    merged.push_str(&existing[region_end..]);
    Ok(merged)
}

/// Merges `(label, generated)` regions in order into `existing`, or into a fresh scaffold
/// for `path` when the artifact does not exist yet.
pub fn merge_regions(
    path: &Path,
    existing: Option<&str>,
    regions: &[(&str, &str)],
) -> Result<String, InjectError> {
    let mut text = match existing {
        Some(text) => text.to_string(),
        None => scaffold(path, regions.iter().map(|(label, _)| *label)),
    };
    for (label, generated) in regions {
        text = replace_region(&text, label, generated)?;
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const ARTIFACT: &str = indoc! {"
        // hand-written preamble
        int keep_me = 1;
        //--- start generated code ---//
        old line 1
        old line 2
        //--- end generated code ---//
        // hand-written trailer
    "};

    #[test]
    fn test_replaces_only_the_region() {
        let merged = replace_region(ARTIFACT, DEFAULT_LABEL, "new();\n").unwrap();
        let expected = indoc! {"
            // hand-written preamble
            int keep_me = 1;
            //--- start generated code ---//
            new();
            //--- end generated code ---//
            // hand-written trailer
        "};
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_replacement_is_idempotent() {
        let once = replace_region(ARTIFACT, DEFAULT_LABEL, "a();\n\nb();").unwrap();
        let twice = replace_region(&once, DEFAULT_LABEL, "a();\n\nb();").unwrap();
        assert_eq!(once, twice);
        assert!(once.contains("b();\n//--- end generated code ---//"));
    }

    #[test]
    fn test_empty_region_collapses_markers() {
        let merged = replace_region(ARTIFACT, DEFAULT_LABEL, "").unwrap();
        assert!(merged.contains("//--- start generated code ---//\n//--- end generated code ---//\n"));
    }

    #[test]
    fn test_indented_end_marker_keeps_its_indentation() {
        let text = "  //--- start x ---//\n  stale\n  //--- end x ---//\n";
        let merged = replace_region(text, "x", "fresh\n").unwrap();
        assert_eq!(merged, "  //--- start x ---//\nfresh\n  //--- end x ---//\n");
    }

    #[test]
    fn test_markers_on_one_line() {
        let text = "//--- start x ---////--- end x ---//\n";
        let merged = replace_region(text, "x", "body\n").unwrap();
        assert_eq!(merged, "//--- start x ---//\nbody\n//--- end x ---//\n");
    }

    #[test]
    fn test_text_between_markers_on_one_line_is_replaced() {
        let text = "before //--- start x ---// stale //--- end x ---// after\n";
        let merged = replace_region(text, "x", "fresh").unwrap();
        assert_eq!(merged, "before //--- start x ---//\nfresh\n//--- end x ---// after\n");
        assert!(!merged.contains("stale"));
        assert_eq!(replace_region(&merged, "x", "fresh").unwrap(), merged);
    }

    #[test]
    fn test_other_labels_are_untouched() {
        let text = indoc! {"
            //--- start one ---//
            1
            //--- end one ---//
            //--- start two ---//
            2
            //--- end two ---//
        "};
        let merged = replace_region(text, "two", "22\n").unwrap();
        assert!(merged.starts_with("//--- start one ---//\n1\n//--- end one ---//\n"));
        assert!(merged.ends_with("//--- start two ---//\n22\n//--- end two ---//\n"));
    }

    #[test]
    fn test_marker_errors() {
        assert_eq!(
            replace_region("nothing here\n", "x", ""),
            Err(InjectError::MissingMarker { marker: start_marker("x") })
        );
        assert_eq!(
            replace_region("//--- start x ---//\n", "x", ""),
            Err(InjectError::MissingMarker { marker: end_marker("x") })
        );
        assert_eq!(
            replace_region("//--- end x ---//\n//--- start x ---//\n", "x", ""),
            Err(InjectError::MisorderedMarkers { label: "x".to_string() })
        );
        assert_eq!(
            replace_region("//--- start x ---//\n//--- start x ---//\n//--- end x ---//\n", "x", ""),
            Err(InjectError::DuplicateMarker { marker: start_marker("x"), count: 2 })
        );
    }

    #[test]
    fn test_scaffold_resolves_include_name() {
        let path = Path::new("lps/include/mcrl2/lps/detail/traverser.inc.h");
        assert_eq!(include_name(path), "mcrl2/lps/detail/traverser.inc.h");
        assert_eq!(include_name(Path::new("out/traverser.inc.h")), "out/traverser.inc.h");

        let text = scaffold(path, [DEFAULT_LABEL]);
        assert!(text.contains("/// \\file mcrl2/lps/detail/traverser.inc.h\n"));
        assert!(text.ends_with("\n//--- start generated code ---//\n//--- end generated code ---//\n"));
        assert!(text.starts_with("// Author(s)"));
    }

    #[test]
    fn test_merge_regions_into_new_artifact() {
        let path = Path::new("include/mcrl2/a/builder.inc.h");
        let text = merge_regions(path, None, &[("one", "1\n"), ("two", "2\n"), ("one", "11\n")]).unwrap();
        assert_eq!(text.matches("//--- start one ---//").count(), 1);
        assert!(text.contains("//--- start one ---//\n11\n//--- end one ---//\n"));
        assert!(text.ends_with("//--- start two ---//\n2\n//--- end two ---//\n"));
    }
}
