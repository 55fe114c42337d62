use crate::points::record::PointRecord;
use crate::prelude::{LoadError, LoadResult};
use crate::telemetry::log::LogManager;
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

pub const COLUMN_X: &str = "POINT_X";
pub const COLUMN_Y: &str = "POINT_Y";
pub const COLUMN_TIME: &str = "TIME";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// Parses the timestamp spellings commonly exported by spreadsheets.
/// Offsets on RFC 3339 input are dropped and the wall-clock time kept.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn delimiter_for(path: &Path) -> u8 {
    match extension(path).as_deref() {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    extension(path).is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.as_str()))
}

/// Positions of the x, y and time columns in a header row.
fn locate_columns<S: AsRef<str>>(headers: &[S]) -> LoadResult<[usize; 3]> {
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.as_ref().trim().trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    Ok([column(COLUMN_X)?, column(COLUMN_Y)?, column(COLUMN_TIME)?])
}

/// Reads every point record from a spreadsheet (first worksheet) or a
/// delimited text file with a header row, chosen by file extension.
pub fn load_points<P: AsRef<Path>>(path: P) -> LoadResult<Vec<PointRecord>> {
    let path = path.as_ref();
    let points = if is_spreadsheet(path) {
        read_workbook(path)?
    } else {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        read_points(BufReader::new(file), delimiter_for(path))?
    };
    LogManager::new("loader").record(&format!(
        "loaded {} point records from {}",
        points.len(),
        path.display()
    ));
    Ok(points)
}

/// Reads point records from any reader; split out so callers can feed
/// in-memory data.
pub fn read_points<R: Read>(reader: R, delimiter: u8) -> LoadResult<Vec<PointRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let [x_idx, y_idx, time_idx] = locate_columns(&headers)?;

    let mut points = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let coordinate = |idx: usize, name: &str| {
            field(idx)
                .parse::<f64>()
                .map_err(|_| LoadError::InvalidCoordinate {
                    row,
                    column: name.to_string(),
                    value: field(idx).to_string(),
                })
        };
        let x = coordinate(x_idx, COLUMN_X)?;
        let y = coordinate(y_idx, COLUMN_Y)?;

        let raw_time = field(time_idx);
        let timestamp = parse_timestamp(raw_time).ok_or_else(|| LoadError::InvalidTimestamp {
            row,
            value: raw_time.to_string(),
        })?;

        points.push(PointRecord::new(x, y, timestamp));
    }

    Ok(points)
}

/// Reads the first worksheet of an Excel or OpenDocument workbook. Time cells
/// may hold native date values or any text layout `parse_timestamp` accepts.
pub fn read_workbook(path: &Path) -> LoadResult<Vec<PointRecord>> {
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|file| BufReader::new(file).read_to_end(&mut bytes))
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|cell| cell.to_string()).collect())
        .unwrap_or_default();
    let [x_idx, y_idx, time_idx] = locate_columns(&headers)?;

    let mut points = Vec::new();
    let data_rows = rows.filter(|cells| !cells.iter().all(|cell| cell.is_empty()));
    for (index, cells) in data_rows.enumerate() {
        let row = index + 1;
        let cell = |idx: usize| cells.get(idx).unwrap_or(&Data::Empty);

        let coordinate = |idx: usize, name: &str| {
            cell(idx)
                .as_f64()
                .ok_or_else(|| LoadError::InvalidCoordinate {
                    row,
                    column: name.to_string(),
                    value: cell(idx).to_string(),
                })
        };
        let x = coordinate(x_idx, COLUMN_X)?;
        let y = coordinate(y_idx, COLUMN_Y)?;

        let time_cell = cell(time_idx);
        let timestamp = match time_cell {
            Data::String(text) | Data::DateTimeIso(text) => parse_timestamp(text),
            other => other.as_datetime(),
        }
        .ok_or_else(|| LoadError::InvalidTimestamp {
            row,
            value: time_cell.to_string(),
        })?;

        points.push(PointRecord::new(x, y, timestamp));
    }

    Ok(points)
}
