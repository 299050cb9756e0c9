//! CSV table persistence
//!
//! Tables are written to a staging file next to the target and renamed into
//! place, so readers see either the previous table or the complete new one.

use std::fs;
use std::path::Path;

use serde::Serialize;

use super::error::DataError;
use super::schema::validate_header;
use super::types::SalesFact;
use crate::utils::file::staging_path;

/// Read a persisted sales fact table.
///
/// The header is validated against the column contract before any row is
/// deserialized; drift surfaces as [`DataError::SchemaDrift`].
pub fn read_facts(path: &Path) -> Result<Vec<SalesFact>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| DataError::csv(path, e))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| DataError::csv(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    validate_header(&header).map_err(|drift| DataError::SchemaDrift {
        path: path.to_path_buf(),
        drift,
    })?;

    let facts = reader
        .deserialize::<SalesFact>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DataError::csv(path, e))?;

    tracing::debug!(path = %path.display(), rows = facts.len(), "Read sales fact table");
    Ok(facts)
}

/// Replace `path` with `rows` under the given column header.
pub fn write_table<T: Serialize>(
    path: &Path,
    columns: &[&str],
    rows: &[T],
) -> Result<(), DataError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }

    let staging = staging_path(path);
    if let Err(e) = write_rows(&staging, columns, rows) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    fs::rename(&staging, path).map_err(|e| {
        let _ = fs::remove_file(&staging);
        DataError::io(path, e)
    })?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote table");
    Ok(())
}

fn write_rows<T: Serialize>(staging: &Path, columns: &[&str], rows: &[T]) -> Result<(), DataError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(staging)
        .map_err(|e| DataError::csv(staging, e))?;

    writer
        .write_record(columns)
        .map_err(|e| DataError::csv(staging, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| DataError::csv(staging, e))?;
    }
    writer.flush().map_err(|e| DataError::io(staging, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::FACT_COLUMNS;
    use crate::data::types::CustomerType;
    use chrono::NaiveDate;

    fn fact(day: u32, order_id: u64) -> SalesFact {
        SalesFact {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            channel: "Shopify".to_string(),
            order_id,
            sku: "SKU-1".to_string(),
            product_title: "Tee, Classic".to_string(),
            variant_title: String::new(),
            week: "2024-01-15/2024-01-21".to_string(),
            month: "2024-01".to_string(),
            quarter: "2024Q1".to_string(),
            year: 2024,
            units: 1,
            gross_revenue: 20.0,
            discounts: 0.0,
            shipping_charged: 0.0,
            refunds: 0.0,
            net_revenue: 20.0,
            region: "West".to_string(),
            customer_type: CustomerType::Repeat,
            source: "Shopify Direct".to_string(),
            promo_code: "A;B".to_string(),
            promo_cost: 0.0,
            platform_fees: 0.0,
            cogs: 0.0,
            gross_margin: 20.0,
            country: "US".to_string(),
            state: "CA".to_string(),
            sub_channel: "Online Store".to_string(),
        }
    }

    #[test]
    fn test_write_then_read_facts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("facts.csv");
        let rows = vec![fact(15, 1), fact(16, 2)];

        write_table(&path, &FACT_COLUMNS, &rows).unwrap();
        assert!(!staging_path(&path).exists());

        let read = read_facts(&path).unwrap();
        assert_eq!(read, rows);
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.csv");
        write_table::<SalesFact>(&path, &FACT_COLUMNS, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), FACT_COLUMNS.join(","));
        assert!(read_facts(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_facts(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_legacy_table_reports_drift() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.csv");
        fs::write(&path, "date,channel,sku,orders\n2024-01-01,Shopify,A,3\n").unwrap();

        let err = read_facts(&path).unwrap_err();
        assert!(matches!(err, DataError::SchemaDrift { .. }));
    }

    #[test]
    fn test_read_malformed_row_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.csv");
        let mut content = FACT_COLUMNS.join(",");
        content.push('\n');
        content.push_str(&vec!["not-a-value"; FACT_COLUMNS.len()].join(","));
        content.push('\n');
        fs::write(&path, content).unwrap();

        let err = read_facts(&path).unwrap_err();
        assert!(matches!(err, DataError::Csv { .. }));
    }
}
