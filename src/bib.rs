//! Bibliography parsing. The publications page falls back to the lab's
//! `publications.bib` when the backing store is unreachable, normalizing each
//! entry into the same record shape the store returns.

use std::collections::HashMap;

use chrono::{Datelike, Utc};

use crate::web::models::PublicationRecord;

/// One `@type{key, ...}` block with its raw tag values.
#[derive(Clone, Debug)]
pub struct RawBibEntry {
    pub entry_type: String,
    pub citation_key: String,
    pub tags: HashMap<String, String>,
}

/// Parse a BibTeX document into raw entries. `@comment`, `@preamble` and
/// `@string` blocks are skipped; tag keys are lowercased.
pub fn parse_bibliography(input: &str) -> Vec<RawBibEntry> {
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    let mut entries = Vec::new();

    while pos < chars.len() {
        if chars[pos] != '@' {
            pos += 1;
            continue;
        }
        pos += 1;

        let entry_type = read_ident(&chars, &mut pos).to_lowercase();
        skip_ws(&chars, &mut pos);
        if matches!(entry_type.as_str(), "comment" | "preamble" | "string") {
            skip_block(&chars, &mut pos);
            continue;
        }
        if pos >= chars.len() || chars[pos] != '{' {
            continue;
        }
        pos += 1;

        skip_ws(&chars, &mut pos);
        let citation_key = read_until(&chars, &mut pos, &[',', '}']);
        let citation_key = citation_key.trim().to_string();
        if pos < chars.len() && chars[pos] == ',' {
            pos += 1;
        }

        let mut tags = HashMap::new();
        loop {
            skip_ws(&chars, &mut pos);
            if pos >= chars.len() {
                break;
            }
            if chars[pos] == '}' {
                pos += 1;
                break;
            }
            let key = read_until(&chars, &mut pos, &['=', '}']).trim().to_lowercase();
            if pos >= chars.len() || chars[pos] != '=' {
                continue;
            }
            pos += 1;
            skip_ws(&chars, &mut pos);
            let value = read_value(&chars, &mut pos);
            if !key.is_empty() {
                tags.insert(key, value);
            }
            skip_ws(&chars, &mut pos);
            if pos < chars.len() && chars[pos] == ',' {
                pos += 1;
            }
        }

        if !citation_key.is_empty() {
            entries.push(RawBibEntry {
                entry_type,
                citation_key,
                tags,
            });
        }
    }

    entries
}

/// Normalize a raw entry into a publication record, matching the shape the
/// store produces. Missing or unparsable years default to `default_year`.
pub fn normalize_entry(entry: &RawBibEntry, default_year: i32) -> PublicationRecord {
    let tags = &entry.tags;

    let authors: Vec<String> = tags
        .get("author")
        .map(|raw| {
            clean_text(raw)
                .split(" and ")
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let year = tags
        .get("year")
        .and_then(|raw| clean_text(raw).trim().parse::<i32>().ok())
        .unwrap_or(default_year);

    let venue_raw = tags
        .get("journal")
        .or_else(|| tags.get("booktitle"))
        .map(|v| clean_text(v))
        .unwrap_or_default();
    let venue = if venue_raw.is_empty() {
        "Preprint".to_string()
    } else {
        venue_raw
    };

    let title = {
        let cleaned = tags.get("title").map(|t| clean_text(t)).unwrap_or_default();
        if cleaned.is_empty() {
            "Untitled".to_string()
        } else {
            cleaned
        }
    };

    let kind = if tags.get("journal").is_some_and(|j| !j.is_empty()) {
        "Journal"
    } else {
        "Conference"
    };

    PublicationRecord {
        id: entry.citation_key.clone(),
        title,
        authors,
        venue,
        year,
        kind: kind.to_string(),
        doi: optional_tag(tags, "doi"),
        link: optional_tag(tags, "url"),
        summary: optional_tag(tags, "abstract"),
        citation: Some(build_citation(tags, year)),
    }
}

/// Parse and normalize a whole bibliography, defaulting years to the current
/// calendar year.
pub fn publications_from_bibliography(input: &str) -> Vec<PublicationRecord> {
    let default_year = Utc::now().year();
    parse_bibliography(input)
        .iter()
        .map(|entry| normalize_entry(entry, default_year))
        .collect()
}

/// Human-readable citation: `venue volume(number) pages (year)`, skipping
/// empty segments.
pub fn build_citation(tags: &HashMap<String, String>, year: i32) -> String {
    let mut segments = Vec::new();

    let venue = tags
        .get("journal")
        .or_else(|| tags.get("booktitle"))
        .map(|v| clean_text(v))
        .unwrap_or_default();
    if !venue.is_empty() {
        segments.push(venue);
    }

    let volume = tags.get("volume").map(|v| clean_text(v)).unwrap_or_default();
    let number = tags.get("number").map(|v| clean_text(v)).unwrap_or_default();
    if !volume.is_empty() {
        if number.is_empty() {
            segments.push(volume);
        } else {
            segments.push(format!("{volume}({number})"));
        }
    }

    let pages = tags.get("pages").map(|v| clean_text(v)).unwrap_or_default();
    if !pages.is_empty() {
        segments.push(pages);
    }

    segments.push(format!("({year})"));
    segments.join(" ")
}

/// Strip grouping braces and unescape `\'`, `\"` and `\\`.
pub fn clean_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' | '}' => {}
            '\\' => match chars.peek() {
                Some(&next @ ('\'' | '"' | '\\')) => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    out
}

fn optional_tag(tags: &HashMap<String, String>, key: &str) -> Option<String> {
    tags.get(key)
        .map(|v| clean_text(v))
        .filter(|v| !v.is_empty())
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

fn read_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && (chars[*pos].is_alphanumeric() || chars[*pos] == '_') {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn read_until(chars: &[char], pos: &mut usize, stops: &[char]) -> String {
    let start = *pos;
    while *pos < chars.len() && !stops.contains(&chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

/// Read a tag value: `{...}` with nested braces, `"..."`, or a bare token.
fn read_value(chars: &[char], pos: &mut usize) -> String {
    if *pos >= chars.len() {
        return String::new();
    }
    match chars[*pos] {
        '{' => {
            *pos += 1;
            let start = *pos;
            let mut depth = 1usize;
            while *pos < chars.len() {
                match chars[*pos] {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                *pos += 1;
            }
            let value: String = chars[start..*pos].iter().collect();
            if *pos < chars.len() {
                *pos += 1;
            }
            value.trim().to_string()
        }
        '"' => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != '"' {
                if chars[*pos] == '\\' && *pos + 1 < chars.len() {
                    *pos += 1;
                }
                *pos += 1;
            }
            let value: String = chars[start..*pos].iter().collect();
            if *pos < chars.len() {
                *pos += 1;
            }
            value.trim().to_string()
        }
        _ => read_until(chars, pos, &[',', '}', '\n']).trim().to_string(),
    }
}

/// Skip a braced block (used for `@comment` and friends).
fn skip_block(chars: &[char], pos: &mut usize) {
    if *pos >= chars.len() || chars[*pos] != '{' {
        return;
    }
    let mut depth = 0usize;
    while *pos < chars.len() {
        match chars[*pos] {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    *pos += 1;
                    return;
                }
            }
            _ => {}
        }
        *pos += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
@comment{not an entry}
@article{kim2021soundscape,
  title = {Urban {Soundscape} Perception},
  author = {A and B},
  journal = {Applied Acoustics},
  volume = {180},
  number = {3},
  pages = {108--120},
  year = "2021",
  doi = {10.1000/xyz}
}
@inproceedings{lee2023vr,
  title = {VR Acoustics},
  author = {Lee, J. and Park, S. and Choi, H.},
  booktitle = {Proceedings of Internoise},
  year = {2023}
}
"#;

    #[test]
    fn parses_entries_and_skips_comments() {
        let entries = parse_bibliography(SAMPLE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].citation_key, "kim2021soundscape");
        assert_eq!(entries[0].entry_type, "article");
        assert_eq!(entries[1].tags["booktitle"], "Proceedings of Internoise");
    }

    #[test]
    fn normalizes_authors_and_year() {
        let entries = parse_bibliography(SAMPLE);
        let record = normalize_entry(&entries[0], 2020);
        assert_eq!(record.authors, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(record.year, 2021);
        assert_eq!(record.kind, "Journal");
        assert_eq!(record.venue, "Applied Acoustics");
        assert_eq!(record.doi.as_deref(), Some("10.1000/xyz"));
    }

    #[test]
    fn missing_year_falls_back_to_default() {
        let entries = parse_bibliography("@misc{x, title={T}, author={Solo Author}}");
        let record = normalize_entry(&entries[0], 2026);
        assert_eq!(record.year, 2026);
        assert_eq!(record.venue, "Preprint");
        assert_eq!(record.kind, "Conference");
    }

    #[test]
    fn citation_includes_volume_issue_and_pages() {
        let entries = parse_bibliography(SAMPLE);
        let record = normalize_entry(&entries[0], 2020);
        assert_eq!(
            record.citation.as_deref(),
            Some("Applied Acoustics 180(3) 108--120 (2021)")
        );
    }

    #[test]
    fn citation_without_venue_keeps_year() {
        let tags = HashMap::new();
        assert_eq!(build_citation(&tags, 2022), "(2022)");
    }

    #[test]
    fn clean_text_strips_braces_and_escapes() {
        assert_eq!(clean_text("{Urban} Sound"), "Urban Sound");
        assert_eq!(clean_text(r#"O\'Neill"#), "O'Neill");
        assert_eq!(clean_text(r"a \\ b"), r"a \ b");
    }

    #[test]
    fn multi_author_split_trims_names() {
        let entries = parse_bibliography(SAMPLE);
        let record = normalize_entry(&entries[1], 2020);
        assert_eq!(
            record.authors,
            vec!["Lee, J.".to_string(), "Park, S.".to_string(), "Choi, H.".to_string()]
        );
    }
}
