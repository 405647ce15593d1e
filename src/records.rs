//! Loading structured property records from CSV exports.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{GeoPoint, PropertyRecord};

const STREET_COLUMNS: &[&str] = &["street", "address", "street_address"];
const CITY_COLUMNS: &[&str] = &["city"];
const STATE_COLUMNS: &[&str] = &["state"];
const ZIP_COLUMNS: &[&str] = &["zip", "zip_code", "postal_code", "postcode"];
const MAILING_COLUMNS: &[&str] = &["mailing_address"];
const ID_COLUMNS: &[&str] = &["id"];
const LAT_COLUMNS: &[&str] = &["latitude", "lat"];
const LON_COLUMNS: &[&str] = &["longitude", "lng", "lon"];

/// Load property records from a CSV file, gzip-compressed if it ends in `.gz`.
pub fn load_records(path: &Path) -> Result<Vec<PropertyRecord>> {
    info!("Loading property records from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("Failed to open records file {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    read_records(reader)
}

/// Column positions resolved from the header row
struct Columns {
    street: usize,
    city: Option<usize>,
    state: Option<usize>,
    zip: Option<usize>,
    mailing_address: Option<usize>,
    id: Option<usize>,
    lat: Option<usize>,
    lon: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        Ok(Self {
            street: find(STREET_COLUMNS).context("Column 'street' not found")?,
            city: find(CITY_COLUMNS),
            state: find(STATE_COLUMNS),
            zip: find(ZIP_COLUMNS),
            mailing_address: find(MAILING_COLUMNS),
            id: find(ID_COLUMNS),
            lat: find(LAT_COLUMNS),
            lon: find(LON_COLUMNS),
        })
    }
}

fn field(row: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Parse records from any CSV reader with a header row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<PropertyRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in csv_reader.records() {
        let row = result?;

        let Some(street) = field(&row, Some(columns.street)) else {
            skipped += 1;
            continue;
        };

        let location = match (
            field(&row, columns.lat).and_then(|v| v.parse::<f64>().ok()),
            field(&row, columns.lon).and_then(|v| v.parse::<f64>().ok()),
        ) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };

        let attributes: HashMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.trim().to_string(), v.to_string()))
            .collect();

        records.push(PropertyRecord {
            id: field(&row, columns.id).map(str::to_string),
            street: street.to_string(),
            city: field(&row, columns.city).unwrap_or_default().to_string(),
            state: field(&row, columns.state).unwrap_or_default().to_string(),
            zip: field(&row, columns.zip).unwrap_or_default().to_string(),
            mailing_address: field(&row, columns.mailing_address).map(str::to_string),
            location,
            attributes,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} record(s) without a street address", skipped);
    }
    info!("Loaded {} property records", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const SAMPLE: &str = "\
id,Address,City,State,Zip_Code,lat,lng,owner
1,123 Main St,Columbia,SC,29201,34.0,-81.0,Acme
2,,Columbia,SC,29201,,,Nobody
3,9 Oak Ave,Irmo,SC,29063,not-a-number,-81.2,
";

    #[test]
    fn test_header_aliases_and_attributes() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id.as_deref(), Some("1"));
        assert_eq!(first.street, "123 Main St");
        assert_eq!(first.city, "Columbia");
        assert_eq!(first.zip, "29201");
        assert_eq!(first.location, Some(GeoPoint::new(34.0, -81.0)));
        assert_eq!(first.attributes.get("owner").map(String::as_str), Some("Acme"));
        assert_eq!(first.attributes.len(), 8);

        // Unparseable latitude leaves the record without a location
        assert_eq!(records[1].street, "9 Oak Ave");
        assert_eq!(records[1].location, None);
    }

    #[test]
    fn test_missing_street_column() {
        let err = read_records("name,city\nx,y\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("street"));
    }

    #[test]
    fn test_load_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv.gz");

        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].zip, "29063");
    }

    #[test]
    fn test_load_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
    }
}
