// Human-readable request code generation.
//
// Codes look like GBB_SDA_0325_CS_001: a fixed prefix, the month bucket,
// the service-type slug, and a 3-digit sequence starting at 001 per
// (month, slug) bucket. The zero-padded fixed-width suffix makes the
// lexicographic maximum of existing codes also the numeric maximum.

use chrono::{Datelike, NaiveDate};
use sqlx::{Sqlite, Transaction};

use crate::core::Result;
use crate::modules::requests::models::ServiceType;

const ID_PREFIX: &str = "GBB_SDA";

/// The shared prefix of every code in one (month, service-type) bucket,
/// including the trailing underscore
pub fn bucket_prefix(service_type: &ServiceType, today: NaiveDate) -> String {
    format!(
        "{}_{:02}{:02}_{}_",
        ID_PREFIX,
        today.month(),
        today.year() % 100,
        service_type.slug()
    )
}

/// Sequence following the highest existing code in a bucket; 1 when the
/// bucket is empty or the suffix is unreadable
pub fn next_sequence(last_id: Option<&str>) -> u32 {
    last_id
        .and_then(|id| id.rsplit('_').next())
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map(|n| n + 1)
        .unwrap_or(1)
}

pub fn format_custom_id(prefix: &str, sequence: u32) -> String {
    format!("{}{:03}", prefix, sequence)
}

/// Next free code for the bucket, looked up inside the caller's transaction
/// so concurrent creates cannot observe the same maximum. The UNIQUE
/// constraint on custom_id backstops the race; callers retry on violation.
pub async fn next_custom_id(
    tx: &mut Transaction<'_, Sqlite>,
    service_type: &ServiceType,
    today: NaiveDate,
) -> Result<String> {
    let prefix = bucket_prefix(service_type, today);

    let last: Option<String> = sqlx::query_scalar(
        r#"
        SELECT custom_id FROM requests
        WHERE custom_id LIKE ?
        ORDER BY custom_id DESC
        LIMIT 1
        "#,
    )
    .bind(format!("{}%", prefix))
    .fetch_optional(&mut **tx)
    .await?;

    Ok(format_custom_id(&prefix, next_sequence(last.as_deref())))
}
