//! Public, unauthenticated pages. Each handler pulls from the read-only
//! accessors and renders into the shared shell.

use std::collections::BTreeMap;

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};
use tracing::error;

use crate::web::{
    AppState, data,
    headers::CspNonce,
    models::{NewsMeta, Person, PublicationRecord},
    templates::{SITE_NAME, escape_html, render_page},
};

pub async fn home_page(
    State(state): State<AppState>,
    Extension(CspNonce(nonce)): Extension<CspNonce>,
) -> Html<String> {
    let publications = data::fetch_publications(&state).await;
    let news = data::list_news(&state.config().news_dir()).unwrap_or_else(|err| {
        error!(?err, "failed to list news for home page");
        Vec::new()
    });

    let recent_pubs = publications
        .iter()
        .take(5)
        .map(render_publication_entry)
        .collect::<Vec<_>>()
        .join("\n");
    let recent_news = news
        .iter()
        .take(3)
        .map(render_news_item)
        .collect::<Vec<_>>()
        .join("\n");

    let main = format!(
        r#"<section class="panel">
    <h1>{SITE_NAME}</h1>
    <p class="muted">We study how people experience the sonic environment of cities — soundscape perception,
    architectural acoustics, and healthy habitats — combining field measurement, listening experiments,
    and computational modelling.</p>
</section>
<section>
    <h2>Latest news</h2>
    <div class="panel">{recent_news}</div>
</section>
<section>
    <h2>Recent publications</h2>
    <div class="panel">{recent_pubs}</div>
</section>"#
    );

    Html(render_page(SITE_NAME, &nonce, &main))
}

pub async fn publications_page(
    State(state): State<AppState>,
    Extension(CspNonce(nonce)): Extension<CspNonce>,
) -> Html<String> {
    let publications = data::fetch_publications(&state).await;

    let mut sections = String::new();
    for (year, records) in group_by_year(&publications) {
        let entries = records
            .iter()
            .map(|record| render_publication_entry(record))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push_str(&format!(
            r#"<h2 class="pub-year">{year}</h2>
<div class="panel">{entries}</div>
"#
        ));
    }
    if sections.is_empty() {
        sections = r#"<p class="muted">No publications yet.</p>"#.to_string();
    }

    let main = format!("<h1>Publications</h1>\n{sections}");
    Html(render_page("Publications", &nonce, &main))
}

pub async fn people_page(
    State(state): State<AppState>,
    Extension(CspNonce(nonce)): Extension<CspNonce>,
) -> Html<String> {
    let people = match data::load_people(&state.config().data_dir) {
        Ok(people) => people,
        Err(err) => {
            error!(?err, "failed to load people data");
            let main = unavailable_note("People");
            return Html(render_page("People", &nonce, &main));
        }
    };

    let groups = [
        ("Faculty", &people.faculty),
        ("Postdoctoral researchers", &people.postdocs),
        ("PhD students", &people.phd),
        ("Master's students", &people.masters),
        ("Staff", &people.staff),
        ("Alumni", &people.alumni),
    ];

    let mut sections = String::new();
    for (label, members) in groups {
        if members.is_empty() {
            continue;
        }
        let entries = members.iter().map(render_person).collect::<Vec<_>>().join("\n");
        sections.push_str(&format!(
            r#"<section class="people-group">
    <h2>{label}</h2>
    <div class="panel">{entries}</div>
</section>
"#
        ));
    }

    let main = format!("<h1>People</h1>\n{sections}");
    Html(render_page("People", &nonce, &main))
}

pub async fn research_page(
    State(state): State<AppState>,
    Extension(CspNonce(nonce)): Extension<CspNonce>,
) -> Html<String> {
    let projects = match data::load_research(&state.config().data_dir) {
        Ok(projects) => projects,
        Err(err) => {
            error!(?err, "failed to load research data");
            let main = unavailable_note("Research");
            return Html(render_page("Research", &nonce, &main));
        }
    };

    let cards = projects
        .iter()
        .map(|project| {
            let tags = project
                .tags
                .iter()
                .map(|tag| format!(r#"<span class="tag">{}</span>"#, escape_html(tag)))
                .collect::<Vec<_>>()
                .join("");
            let highlights = project
                .highlights
                .iter()
                .map(|h| format!("<li>{}</li>", escape_html(h)))
                .collect::<Vec<_>>()
                .join("");
            format!(
                r#"<div class="card">
    <h3>{title}</h3>
    <p class="muted">{summary}</p>
    <ul class="muted">{highlights}</ul>
    <p>{tags}<span class="tag">{status}</span></p>
</div>"#,
                title = escape_html(&project.title),
                summary = escape_html(&project.summary),
                status = escape_html(&project.status),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let main = format!(
        r#"<h1>Research</h1>
<div class="card-list">{cards}</div>"#
    );
    Html(render_page("Research", &nonce, &main))
}

pub async fn news_index(
    State(state): State<AppState>,
    Extension(CspNonce(nonce)): Extension<CspNonce>,
) -> Html<String> {
    let news = data::list_news(&state.config().news_dir()).unwrap_or_else(|err| {
        error!(?err, "failed to list news");
        Vec::new()
    });

    let items = if news.is_empty() {
        r#"<p class="muted">No news yet.</p>"#.to_string()
    } else {
        news.iter().map(render_news_item).collect::<Vec<_>>().join("\n")
    };

    let main = format!(
        r#"<h1>News</h1>
<div class="panel">{items}</div>"#
    );
    Html(render_page("News", &nonce, &main))
}

pub async fn news_detail(
    State(state): State<AppState>,
    Extension(CspNonce(nonce)): Extension<CspNonce>,
    Path(slug): Path<String>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let post = match data::load_news_post(&state.config().news_dir(), &slug) {
        Ok(Some(post)) => post,
        Ok(None) => {
            let main = r#"<h1>Not found</h1><p class="muted">No such news post.</p>"#;
            return Err((StatusCode::NOT_FOUND, Html(render_page("Not found", &nonce, main))));
        }
        Err(err) => {
            error!(?err, %slug, "failed to load news post");
            let main = unavailable_note("News");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page("News", &nonce, &main)),
            ));
        }
    };

    let byline = match &post.meta.author {
        Some(author) => format!(" · {}", escape_html(author)),
        None => String::new(),
    };
    let main = format!(
        r#"<article>
    <h1>{title}</h1>
    <p class="news-date">{date}{byline}</p>
    <div class="news-body panel">{body}</div>
</article>"#,
        title = escape_html(&post.meta.title),
        date = escape_html(&post.meta.date),
        body = body_paragraphs(&post.body),
    );
    Ok(Html(render_page(&post.meta.title, &nonce, &main)))
}

/// Group records by year, newest year first, preserving the incoming order
/// within a year.
pub fn group_by_year(records: &[PublicationRecord]) -> Vec<(i32, Vec<&PublicationRecord>)> {
    let mut by_year: BTreeMap<i32, Vec<&PublicationRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year).or_default().push(record);
    }
    by_year.into_iter().rev().collect()
}

/// Render the raw body as escaped paragraphs split on blank lines. Markup
/// conversion is handled outside this codebase; plain paragraphs are enough
/// for the site's short announcements.
pub fn body_paragraphs(body: &str) -> String {
    body.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| format!("<p>{}</p>", escape_html(block)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_publication_entry(record: &PublicationRecord) -> String {
    let mut links = String::new();
    if let Some(doi) = &record.doi {
        links.push_str(&format!(
            r#"<a href="https://doi.org/{doi}" rel="noopener">DOI</a>"#,
            doi = escape_html(doi)
        ));
    }
    if let Some(link) = &record.link {
        links.push_str(&format!(
            r#"<a href="{link}" rel="noopener">Link</a>"#,
            link = escape_html(link)
        ));
    }

    let citation = record
        .citation
        .clone()
        .unwrap_or_else(|| format!("{} ({})", record.venue, record.year));

    format!(
        r#"<div class="pub-entry">
    <div class="pub-title">{title}</div>
    <div class="muted">{authors}</div>
    <div class="muted">{citation}</div>
    <div class="pub-links">{links}</div>
</div>"#,
        title = escape_html(&record.title),
        authors = escape_html(&record.authors.join(", ")),
        citation = escape_html(&citation),
    )
}

fn render_news_item(item: &NewsMeta) -> String {
    format!(
        r#"<div class="news-item">
    <div class="news-date">{date}</div>
    <a href="/news/{slug}">{title}</a>
    <p class="muted">{summary}</p>
</div>"#,
        date = escape_html(&item.date),
        slug = escape_html(&item.slug),
        title = escape_html(&item.title),
        summary = escape_html(&item.summary),
    )
}

fn render_person(person: &Person) -> String {
    let mut details = vec![escape_html(&person.title)];
    if let Some(program) = &person.program {
        details.push(escape_html(program));
    }
    if let Some(period) = &person.period {
        details.push(escape_html(period));
    }
    if let Some(affiliation) = &person.current_affiliation {
        details.push(escape_html(affiliation));
    }
    let contact = match &person.email {
        Some(email) => format!(
            r#"<div class="muted"><a href="mailto:{email}">{email}</a></div>"#,
            email = escape_html(email)
        ),
        None => String::new(),
    };

    format!(
        r#"<div class="person">
    <div class="name">{name}</div>
    <div class="muted">{details}</div>
    {contact}
</div>"#,
        name = escape_html(&person.name),
        details = details.join(" · "),
    )
}

fn unavailable_note(heading: &str) -> String {
    format!(
        r#"<h1>{heading}</h1>
<p class="muted">This content is temporarily unavailable.</p>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, year: i32) -> PublicationRecord {
        PublicationRecord {
            id: id.to_string(),
            title: format!("Paper {id}"),
            authors: vec!["A".to_string()],
            venue: "J".to_string(),
            year,
            kind: "Journal".to_string(),
            doi: None,
            link: None,
            summary: None,
            citation: None,
        }
    }

    #[test]
    fn years_group_newest_first() {
        let records = vec![record("3", 2024), record("2", 2021), record("1", 2024)];
        let grouped = group_by_year(&records);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, 2024);
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, 2021);
    }

    #[test]
    fn body_paragraphs_escape_and_split() {
        let html = body_paragraphs("First <b>block</b>.\n\nSecond block.\n");
        assert_eq!(
            html,
            "<p>First &lt;b&gt;block&lt;/b&gt;.</p>\n<p>Second block.</p>"
        );
    }
}
