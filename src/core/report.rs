use crate::domain::model::{ExtractReport, ResultRecord};
use crate::utils::error::{ExtractError, Result};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

/// Table columns. Emitted in order of first appearance across the records.
pub const COLUMNS: [&str; 9] = [
    "Parcel Number",
    "Lot Plan",
    "Address",
    "Suburb",
    "LGA",
    "Area",
    "Tenure",
    "Overlays",
    "Error",
];

/// A record's cells, indexed like [`COLUMNS`]. `None` means the record has no
/// such column (as opposed to an empty value).
fn cells(record: &ResultRecord) -> [Option<&str>; 9] {
    match record {
        ResultRecord::Success {
            identifier,
            attributes,
            overlays,
        } => [
            Some(identifier.as_str()),
            Some(attributes.lot_plan.as_str()),
            Some(attributes.address.as_str()),
            Some(attributes.suburb.as_str()),
            Some(attributes.lga.as_str()),
            Some(attributes.area.as_str()),
            Some(attributes.tenure.as_str()),
            Some(overlays.as_str()),
            None,
        ],
        ResultRecord::Failure { identifier, error } => [
            Some(identifier.as_str()),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            Some(error.as_str()),
        ],
    }
}

/// Columns present in at least one record, ordered by first appearance: a
/// batch that starts with a failure puts `Error` right after `Parcel Number`.
pub fn present_columns(records: &[ResultRecord]) -> Vec<usize> {
    let mut columns = Vec::with_capacity(COLUMNS.len());
    for record in records {
        for (i, cell) in cells(record).iter().enumerate() {
            if cell.is_some() && !columns.contains(&i) {
                columns.push(i);
            }
        }
    }
    columns
}

pub fn render_delimited(records: &[ResultRecord], delimiter: u8) -> Result<String> {
    let columns = present_columns(records);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|&i| COLUMNS[i]))?;
    for record in records {
        let row = cells(record);
        writer.write_record(columns.iter().map(|&i| row[i].unwrap_or("")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExtractError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))?;
    String::from_utf8(bytes).map_err(invalid_data)
}

fn invalid_data(e: std::string::FromUtf8Error) -> ExtractError {
    ExtractError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Single-sheet workbook with the same header and rows as the delimited output.
pub fn render_xlsx(records: &[ResultRecord]) -> Result<Vec<u8>> {
    let columns = present_columns(records);
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, &i) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, COLUMNS[i], &header)?;
    }
    for (row, record) in records.iter().enumerate() {
        let row_cells = cells(record);
        for (col, &i) in columns.iter().enumerate() {
            if let Some(value) = row_cells[i] {
                worksheet.write_string(row as u32 + 1, col as u16, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    total: usize,
    succeeded: usize,
    failed: usize,
    records: &'a [ResultRecord],
}

pub fn build_report(records: Vec<ResultRecord>, generated_at: DateTime<Utc>) -> Result<ExtractReport> {
    let succeeded = records.iter().filter(|r| r.is_success()).count();
    let failed = records.len() - succeeded;

    let csv_output = render_delimited(&records, b',')?;
    let tsv_output = render_delimited(&records, b'\t')?;
    let json_output = serde_json::to_string_pretty(&JsonReport {
        generated_at,
        total: records.len(),
        succeeded,
        failed,
        records: &records,
    })?;
    let xlsx_output = render_xlsx(&records)?;

    Ok(ExtractReport {
        records,
        csv_output,
        tsv_output,
        json_output,
        xlsx_output,
        succeeded,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{OverlayDescription, ParcelAttributes, ParcelIdentifier};

    fn success(id: &str, overlays: &[&str]) -> ResultRecord {
        let names: Vec<String> = overlays.iter().map(|s| s.to_string()).collect();
        ResultRecord::Success {
            identifier: ParcelIdentifier::new(id),
            attributes: ParcelAttributes {
                lot_plan: id.to_string(),
                address: "12 Smith St, MANGO HILL".to_string(),
                suburb: "Mango Hill".to_string(),
                lga: "Moreton Bay".to_string(),
                area: "607".to_string(),
                tenure: "Freehold".to_string(),
            },
            overlays: OverlayDescription::from_names(&names),
        }
    }

    fn failure(id: &str) -> ResultRecord {
        ResultRecord::Failure {
            identifier: ParcelIdentifier::new(id),
            error: "No parcel found".to_string(),
        }
    }

    #[test]
    fn test_all_success_has_no_error_column() {
        let csv = render_delimited(&[success("2SP335900", &["Flood", "Bushfire"])], b',').unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Parcel Number,Lot Plan,Address,Suburb,LGA,Area,Tenure,Overlays"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2SP335900,2SP335900,\"12 Smith St, MANGO HILL\",Mango Hill,Moreton Bay,607,Freehold,Flood / Bushfire"
        );
    }

    #[test]
    fn test_all_failure_has_only_identifier_and_error() {
        let tsv = render_delimited(&[failure("1XX0")], b'\t').unwrap();

        assert_eq!(tsv, "Parcel Number\tError\n1XX0\tNo parcel found\n");
    }

    #[test]
    fn test_mixed_rows_leave_missing_cells_empty() {
        let csv = render_delimited(&[success("2SP335900", &[]), failure("1XX0")], b',').unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(",Overlays,Error"));
        assert!(lines[1].ends_with(",Freehold,,"));
        assert_eq!(lines[2], "1XX0,,,,,,,,No parcel found");
    }

    #[test]
    fn test_columns_follow_first_appearance() {
        let records = [failure("1XX0"), success("2SP335900", &["Flood"])];

        let csv = render_delimited(&records, b',').unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Parcel Number,Error,Lot Plan,Address,Suburb,LGA,Area,Tenure,Overlays"
        );
        assert_eq!(lines[1], "1XX0,No parcel found,,,,,,,");
        assert!(lines[2].starts_with("2SP335900,,2SP335900,"));
        assert!(lines[2].ends_with(",Freehold,Flood"));
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let bad = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();

        let err = invalid_data(bad);

        match &err {
            ExtractError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::InvalidData),
            other => panic!("expected Io error, got {:?}", other),
        }
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Output);
    }

    fn xlsx_part(bytes: &[u8], name: &str) -> String {
        use std::io::Read;
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut part = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut part).unwrap();
        part
    }

    #[test]
    fn test_render_xlsx_writes_table_sheet() {
        let bytes = render_xlsx(&[failure("1XX0"), success("2SP335900", &["Flood", "Bushfire"])]).unwrap();

        assert!(bytes.starts_with(b"PK"));
        let sheet = xlsx_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<dimension ref=\"A1:I3\"/>"));

        let strings = xlsx_part(&bytes, "xl/sharedStrings.xml");
        for text in ["Parcel Number", "Error", "Overlays", "No parcel found", "Flood / Bushfire"] {
            assert!(strings.contains(text), "missing {}", text);
        }
    }

    #[test]
    fn test_build_report_counts() {
        let report = build_report(vec![success("A", &[]), failure("B")], Utc::now()).unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);

        let json: serde_json::Value = serde_json::from_str(&report.json_output).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["records"][1]["status"], "failure");
    }
}
