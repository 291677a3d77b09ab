use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A publications row as stored in Postgres. The `type` column is surfaced as
/// `kind` in Rust and renamed back on the wire.
#[derive(Clone, Debug, Serialize, FromRow)]
pub struct PublicationRow {
    pub id: i64,
    pub title: String,
    pub authors: Vec<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub doi: Option<String>,
    pub link: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub summary: Option<String>,
    pub citation: Option<String>,
}

/// The read shape the public pages consume. Store rows and bibliography
/// entries both normalize into this; bibliography ids are citation keys, so
/// the id is a string either way.
#[derive(Clone, Debug, Serialize)]
pub struct PublicationRecord {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub venue: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl From<PublicationRow> for PublicationRecord {
    fn from(row: PublicationRow) -> Self {
        Self {
            id: row.id.to_string(),
            title: row.title,
            authors: row.authors,
            venue: row.venue.unwrap_or_default(),
            year: row.year.unwrap_or(0),
            kind: row.kind.unwrap_or_default(),
            doi: row.doi,
            link: row.link,
            summary: row.summary,
            citation: row.citation,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Person {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, rename = "currentAffiliation", skip_serializing_if = "Option::is_none")]
    pub current_affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career: Option<Vec<String>>,
    #[serde(default, rename = "labIntro", skip_serializing_if = "Option::is_none")]
    pub lab_intro: Option<String>,
}

/// The six fixed people groups from the static configuration file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PeopleData {
    #[serde(default)]
    pub faculty: Vec<Person>,
    #[serde(default)]
    pub postdocs: Vec<Person>,
    #[serde(default)]
    pub phd: Vec<Person>,
    #[serde(default)]
    pub masters: Vec<Person>,
    #[serde(default)]
    pub staff: Vec<Person>,
    #[serde(default)]
    pub alumni: Vec<Person>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ResearchProject {
    pub id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: String,
}

/// News listing entry. Slug comes from the filename; dates are strings kept
/// in ISO 8601 so lexicographic descending order is chronological.
#[derive(Clone, Debug, Serialize)]
pub struct NewsMeta {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewsPost {
    #[serde(flatten)]
    pub meta: NewsMeta,
    pub body: String,
}
