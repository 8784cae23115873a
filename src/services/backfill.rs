//! One-shot backfill of the origin-country column.
//!
//! Older records predate the column, so they carry no country data. The
//! backfill walks every watched row that still has a `NULL` origin country,
//! asks the catalog for the title's countries and writes the result back.
//! Lookups are throttled so a large library does not hammer the upstream API.

use anyhow::Result;
use serde::Serialize;

use crate::clients::tmdb::TmdbClient;
use crate::constants::backfill::THROTTLE;
use crate::db::Store;
use crate::domain::MediaType;

/// Outcome summary returned to the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    pub message: String,
    pub total: usize,
    pub updated: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Fills in the origin country for every watched row that lacks one.
///
/// Rows that fail to resolve are recorded in the report and skipped; one bad
/// title never aborts the run.
///
/// # Errors
///
/// Returns an error when the row listing cannot be read, or when rows need
/// updating but no catalog API key is configured.
pub async fn run(store: &Store, client: &TmdbClient) -> Result<BackfillReport> {
    let rows = store.list_watched_missing_origin_country().await?;
    if rows.is_empty() {
        return Ok(BackfillReport {
            message: "No items to update".to_string(),
            total: 0,
            updated: 0,
            errors: Vec::new(),
        });
    }
    if !client.has_api_key() {
        anyhow::bail!("catalog API key is not configured");
    }

    let total = rows.len();
    let mut updated = 0;
    let mut errors = Vec::new();

    for row in rows {
        match resolve_countries(client, &row.r#type, row.tmdb_id).await {
            Ok(countries) => match store.set_watched_origin_country(row.id, countries).await {
                Ok(_) => updated += 1,
                Err(err) => errors.push(format!("{}: {err}", row.id)),
            },
            Err(err) => errors.push(format!("{}: {err}", row.id)),
        }
        tokio::time::sleep(THROTTLE).await;
    }

    tracing::info!("Origin-country backfill touched {updated} of {total} rows");
    Ok(BackfillReport {
        message: format!("Updated {updated} of {total} items"),
        total,
        updated,
        errors,
    })
}

/// Comma-joined country list for one title, `None` when the catalog reports
/// no countries at all.
async fn resolve_countries(
    client: &TmdbClient,
    raw_type: &str,
    tmdb_id: i32,
) -> Result<Option<String>> {
    let media_type = MediaType::parse(raw_type)
        .ok_or_else(|| anyhow::anyhow!("unknown media type {raw_type}"))?;
    let detail = client
        .detail_plain(media_type, tmdb_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("{media_type} {tmdb_id} not found upstream"))?;

    let joined = detail.origin_countries().join(",");
    Ok((!joined.is_empty()).then_some(joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_hides_an_empty_error_list() {
        let report = BackfillReport {
            message: "Updated 2 of 2 items".to_string(),
            total: 2,
            updated: 2,
            errors: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["updated"], 2);
    }

    #[test]
    fn report_lists_failures_when_present() {
        let report = BackfillReport {
            message: "Updated 1 of 2 items".to_string(),
            total: 2,
            updated: 1,
            errors: vec!["7: movie 99 not found upstream".to_string()],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"][0], "7: movie 99 not found upstream");
    }
}
