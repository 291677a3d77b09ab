//! Publications CRUD, reachable only through the session guard. The write
//! path enforces the record invariant (non-empty title, non-empty author
//! list) before any store round-trip; store failures surface as 500 with the
//! store's message passed through.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::web::{
    AppState,
    models::PublicationRow,
    responses::{ApiError, json_error},
};

const SELECT_COLUMNS: &str =
    r#"id, title, authors, venue, year, "type", doi, link, volume, issue, pages, summary, citation"#;

#[derive(Deserialize, Default)]
pub struct PublicationPayload {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct DeletePayload {
    #[serde(default)]
    pub id: Option<Value>,
}

/// Non-empty trimmed title and a non-empty author array, checked before any
/// store mutation.
pub fn validate_payload(payload: &PublicationPayload) -> Result<(), &'static str> {
    let title_ok = payload
        .title
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    let authors_ok = payload.authors.as_ref().is_some_and(|a| !a.is_empty());
    if title_ok && authors_ok {
        Ok(())
    } else {
        Err("title and authors (array) are required")
    }
}

/// Coerce the loosely-typed `year` field (JSON number or numeric string) to a
/// year, or null.
pub fn coerce_year(value: Option<&Value>) -> Option<i32> {
    match value {
        Some(Value::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Resolve the target id from the route path, falling back to an `id` field
/// in the request body. Only positive integers are valid.
pub fn resolve_id(path_id: &str, body_id: Option<&Value>) -> Option<i64> {
    if let Ok(id) = path_id.trim().parse::<i64>() {
        if id > 0 {
            return Some(id);
        }
    }
    match body_id {
        Some(Value::Number(n)) => n.as_i64().filter(|id| *id > 0),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok().filter(|id| *id > 0),
        _ => None,
    }
}

pub async fn list_publications(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<ApiError>)> {
    let query = format!("SELECT {SELECT_COLUMNS} FROM publications ORDER BY id DESC");
    match sqlx::query_as::<_, PublicationRow>(&query)
        .fetch_all(state.pool_ref())
        .await
    {
        Ok(rows) => Ok(Json(json!({ "publications": rows }))),
        Err(err) => {
            error!(?err, "failed to list publications");
            Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

pub async fn create_publication(
    State(state): State<AppState>,
    body: Option<Json<PublicationPayload>>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<ApiError>)> {
    let Some(Json(payload)) = body else {
        return Err(json_error(StatusCode::BAD_REQUEST, "Invalid JSON"));
    };
    validate_payload(&payload).map_err(|msg| json_error(StatusCode::BAD_REQUEST, msg))?;

    let year = coerce_year(payload.year.as_ref());
    let query = format!(
        r#"INSERT INTO publications (title, authors, venue, year, "type", doi, link, volume, issue, pages, summary)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
           RETURNING {SELECT_COLUMNS}"#
    );
    match sqlx::query_as::<_, PublicationRow>(&query)
        .bind(&payload.title)
        .bind(&payload.authors)
        .bind(&payload.venue)
        .bind(year)
        .bind(&payload.kind)
        .bind(&payload.doi)
        .bind(&payload.link)
        .bind(&payload.volume)
        .bind(&payload.issue)
        .bind(&payload.pages)
        .bind(&payload.summary)
        .fetch_one(state.pool_ref())
        .await
    {
        Ok(row) => Ok((StatusCode::CREATED, Json(json!({ "publication": row })))),
        Err(err) => {
            error!(?err, "failed to create publication");
            Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

pub async fn update_publication(
    State(state): State<AppState>,
    Path(path_id): Path<String>,
    body: Option<Json<PublicationPayload>>,
) -> Result<Json<Value>, (StatusCode, Json<ApiError>)> {
    let Some(Json(payload)) = body else {
        return Err(json_error(StatusCode::BAD_REQUEST, "Invalid JSON"));
    };
    let Some(id) = resolve_id(&path_id, payload.id.as_ref()) else {
        return Err(json_error(StatusCode::BAD_REQUEST, "Invalid id"));
    };
    validate_payload(&payload).map_err(|msg| json_error(StatusCode::BAD_REQUEST, msg))?;

    let year = coerce_year(payload.year.as_ref());
    let query = format!(
        r#"UPDATE publications
           SET title = $1, authors = $2, venue = $3, year = $4, "type" = $5, doi = $6,
               link = $7, volume = $8, issue = $9, pages = $10, summary = $11, updated_at = NOW()
           WHERE id = $12
           RETURNING {SELECT_COLUMNS}"#
    );
    match sqlx::query_as::<_, PublicationRow>(&query)
        .bind(&payload.title)
        .bind(&payload.authors)
        .bind(&payload.venue)
        .bind(year)
        .bind(&payload.kind)
        .bind(&payload.doi)
        .bind(&payload.link)
        .bind(&payload.volume)
        .bind(&payload.issue)
        .bind(&payload.pages)
        .bind(&payload.summary)
        .bind(id)
        .fetch_optional(state.pool_ref())
        .await
    {
        Ok(Some(row)) => Ok(Json(json!({ "publication": row }))),
        Ok(None) => Err(json_error(StatusCode::NOT_FOUND, "Publication not found")),
        Err(err) => {
            error!(?err, "failed to update publication");
            Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

pub async fn delete_publication(
    State(state): State<AppState>,
    Path(path_id): Path<String>,
    body: Option<Json<DeletePayload>>,
) -> Result<Json<Value>, (StatusCode, Json<ApiError>)> {
    let body_id = body.as_ref().and_then(|Json(payload)| payload.id.as_ref());
    let Some(id) = resolve_id(&path_id, body_id) else {
        return Err(json_error(StatusCode::BAD_REQUEST, "Invalid id"));
    };

    match sqlx::query("DELETE FROM publications WHERE id = $1")
        .bind(id)
        .execute(state.pool_ref())
        .await
    {
        Ok(result) if result.rows_affected() > 0 => Ok(Json(json!({ "ok": true }))),
        Ok(_) => Err(json_error(StatusCode::NOT_FOUND, "Publication not found")),
        Err(err) => {
            error!(?err, "failed to delete publication");
            Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: Option<&str>, authors: Option<Vec<&str>>) -> PublicationPayload {
        PublicationPayload {
            title: title.map(str::to_string),
            authors: authors.map(|a| a.into_iter().map(str::to_string).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_title_is_rejected() {
        assert!(validate_payload(&payload(None, Some(vec!["A"]))).is_err());
        assert!(validate_payload(&payload(Some("   "), Some(vec!["A"]))).is_err());
    }

    #[test]
    fn empty_author_list_is_rejected() {
        assert!(validate_payload(&payload(Some("Title"), None)).is_err());
        assert!(validate_payload(&payload(Some("Title"), Some(vec![]))).is_err());
    }

    #[test]
    fn complete_payload_passes_validation() {
        assert!(validate_payload(&payload(Some("Title"), Some(vec!["A", "B"]))).is_ok());
    }

    #[test]
    fn year_coerces_numbers_and_numeric_strings() {
        assert_eq!(coerce_year(Some(&json!(2021))), Some(2021));
        assert_eq!(coerce_year(Some(&json!("2021"))), Some(2021));
        assert_eq!(coerce_year(Some(&json!(" 1998 "))), Some(1998));
        assert_eq!(coerce_year(Some(&json!(""))), None);
        assert_eq!(coerce_year(Some(&json!("soon"))), None);
        assert_eq!(coerce_year(Some(&Value::Null)), None);
        assert_eq!(coerce_year(None), None);
    }

    #[test]
    fn id_resolves_from_path_then_body() {
        assert_eq!(resolve_id("7", None), Some(7));
        assert_eq!(resolve_id("abc", Some(&json!(12))), Some(12));
        assert_eq!(resolve_id("abc", Some(&json!("12"))), Some(12));
        assert_eq!(resolve_id("abc", Some(&json!("x"))), None);
        assert_eq!(resolve_id("0", None), None);
        assert_eq!(resolve_id("-3", Some(&json!(-4))), None);
    }
}
