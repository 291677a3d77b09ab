//! Read-only content accessors for the public pages: publications from the
//! backing store (with a bibliography-file fallback), people and research
//! projects from static JSON, news posts from a directory of dated markdown
//! documents.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::{
    bib,
    web::{
        AppState,
        models::{NewsMeta, NewsPost, PeopleData, PublicationRecord, PublicationRow, ResearchProject},
    },
};

/// Publications ordered by descending identifier. A store failure is not an
/// error on the public read path: the bibliography file stands in.
pub async fn fetch_publications(state: &AppState) -> Vec<PublicationRecord> {
    let result = sqlx::query_as::<_, PublicationRow>(
        r#"SELECT id, title, authors, venue, year, "type", doi, link, volume, issue, pages, summary, citation
           FROM publications ORDER BY id DESC"#,
    )
    .fetch_all(state.pool_ref())
    .await;

    match result {
        Ok(rows) => rows.into_iter().map(PublicationRecord::from).collect(),
        Err(err) => {
            warn!(?err, "publications store unreachable, falling back to bibliography");
            load_bibliography(&state.config().bibliography_path())
        }
    }
}

pub fn load_bibliography(path: &Path) -> Vec<PublicationRecord> {
    match fs::read_to_string(path) {
        Ok(raw) => bib::publications_from_bibliography(&raw),
        Err(err) => {
            warn!(?err, path = %path.display(), "failed to read bibliography file");
            Vec::new()
        }
    }
}

pub fn load_people(data_dir: &Path) -> Result<PeopleData> {
    let path = data_dir.join("people.json");
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn load_research(data_dir: &Path) -> Result<Vec<ResearchProject>> {
    let path = data_dir.join("research.json");
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[derive(Deserialize)]
struct NewsFrontMatter {
    title: String,
    date: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Scan the news directory for `*.md` documents, deriving each slug from the
/// filename. Sorted descending by date string; dates are expected in ISO 8601
/// so lexicographic order equals chronological order. Documents that fail to
/// parse are skipped with a warning rather than taking the listing down.
pub fn list_news(news_dir: &Path) -> Result<Vec<NewsMeta>> {
    let entries = fs::read_dir(news_dir)
        .with_context(|| format!("failed to read news directory {}", news_dir.display()))?;

    let mut posts = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(?err, path = %path.display(), "failed to read news document");
                continue;
            }
        };
        match parse_news_document(slug, &raw) {
            Ok((meta, _)) => posts.push(meta),
            Err(err) => {
                warn!(?err, path = %path.display(), "failed to parse news document");
            }
        }
    }

    posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(posts)
}

/// Load one news post by slug. The slug is sanitized before the path join so
/// a crafted value cannot escape the news directory. Returns `None` for an
/// unknown slug.
pub fn load_news_post(news_dir: &Path, slug: &str) -> Result<Option<NewsPost>> {
    let safe = sanitize_filename::sanitize(slug);
    let path = news_dir.join(format!("{safe}.md"));
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let (meta, body) = parse_news_document(&safe, &raw)?;
    Ok(Some(NewsPost { meta, body }))
}

/// Split the YAML front matter from the body and build the listing metadata.
/// A missing summary defaults to the first 140 characters of the body.
pub fn parse_news_document(slug: &str, raw: &str) -> Result<(NewsMeta, String)> {
    let (front, body) = split_front_matter(raw);
    let front = front.context("news document has no front matter")?;
    let parsed: NewsFrontMatter =
        serde_yaml::from_str(front).context("invalid news front matter")?;

    let body = body.trim_start_matches(['\r', '\n']).to_string();
    let summary = match parsed.summary {
        Some(summary) => summary,
        None => body.chars().take(140).collect::<String>().trim().to_string(),
    };

    Ok((
        NewsMeta {
            slug: slug.to_string(),
            title: parsed.title,
            date: parsed.date,
            summary,
            author: parsed.author,
            tags: parsed.tags,
        },
        body,
    ))
}

fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let Some(stripped) = raw.strip_prefix("---") else {
        return (None, raw);
    };
    let Some(end) = stripped.find("\n---") else {
        return (None, raw);
    };
    let front = &stripped[..end];
    let mut body = &stripped[end + 4..];
    if let Some(rest) = body.strip_prefix('\r') {
        body = rest;
    }
    if let Some(rest) = body.strip_prefix('\n') {
        body = rest;
    }
    (Some(front), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = fs::File::create(dir.join(name)).expect("create file");
        file.write_all(contents.as_bytes()).expect("write file");
    }

    #[test]
    fn parses_front_matter_and_body() {
        let raw = "---\ntitle: Lab retreat\ndate: \"2024-05-20\"\nsummary: Annual retreat.\nauthor: Kim\n---\n\nWe met at the coast.\n";
        let (meta, body) = parse_news_document("2024-05-20-retreat", raw).expect("parse");
        assert_eq!(meta.slug, "2024-05-20-retreat");
        assert_eq!(meta.title, "Lab retreat");
        assert_eq!(meta.date, "2024-05-20");
        assert_eq!(meta.summary, "Annual retreat.");
        assert_eq!(meta.author.as_deref(), Some("Kim"));
        assert_eq!(body, "We met at the coast.\n");
    }

    #[test]
    fn missing_summary_defaults_to_body_prefix() {
        let raw = "---\ntitle: T\ndate: \"2024-01-01\"\n---\nA short body.";
        let (meta, _) = parse_news_document("t", raw).expect("parse");
        assert_eq!(meta.summary, "A short body.");
    }

    #[test]
    fn listing_sorts_descending_by_date() {
        let dir = tempdir().expect("temp dir");
        write_file(
            dir.path(),
            "2024-03-01-seminar.md",
            "---\ntitle: Seminar\ndate: \"2024-03-01\"\n---\nbody",
        );
        write_file(
            dir.path(),
            "2024-05-20-retreat.md",
            "---\ntitle: Retreat\ndate: \"2024-05-20\"\n---\nbody",
        );
        write_file(dir.path(), "notes.txt", "not news");

        let posts = list_news(dir.path()).expect("list");
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].slug, "2024-05-20-retreat");
        assert_eq!(posts[1].slug, "2024-03-01-seminar");
    }

    #[test]
    fn unparsable_documents_are_skipped() {
        let dir = tempdir().expect("temp dir");
        write_file(
            dir.path(),
            "good.md",
            "---\ntitle: Good\ndate: \"2024-01-02\"\n---\nbody",
        );
        write_file(dir.path(), "bad.md", "no front matter here");

        let posts = list_news(dir.path()).expect("list");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "good");
    }

    #[test]
    fn unknown_slug_returns_none() {
        let dir = tempdir().expect("temp dir");
        let post = load_news_post(dir.path(), "missing").expect("load");
        assert!(post.is_none());
    }

    #[test]
    fn traversal_slug_cannot_escape_news_dir() {
        let dir = tempdir().expect("temp dir");
        let post = load_news_post(dir.path(), "../../etc/passwd").expect("load");
        assert!(post.is_none());
    }

    #[test]
    fn bibliography_fallback_reads_and_normalizes() {
        let dir = tempdir().expect("temp dir");
        write_file(
            dir.path(),
            "publications.bib",
            "@article{a2021, title={T}, author={A and B}, journal={J}, year={2021}}",
        );
        let records = load_bibliography(&dir.path().join("publications.bib"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].authors, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(records[0].year, 2021);
    }

    #[test]
    fn missing_bibliography_yields_empty_list() {
        let dir = tempdir().expect("temp dir");
        let records = load_bibliography(&dir.path().join("absent.bib"));
        assert!(records.is_empty());
    }
}
