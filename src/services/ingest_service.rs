use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::chart::numeric::parse_decimal_exact;
use crate::config::SheetchartConfig;
use crate::dataset::{CellValue, OwnerId, TabularDataset};
use crate::errors::{IngestError, IngestResult};
use crate::services::file_type_detection::{detect_file_format, FileFormat};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Raw upload handed over by the transport layer
#[derive(Clone, Copy, Debug)]
pub struct Upload<'a> {
    pub bytes: &'a [u8],
    pub file_name: &'a str,
    pub declared_mime: Option<&'a str>,
}

impl<'a> Upload<'a> {
    pub fn new(bytes: &'a [u8], file_name: &'a str) -> Self {
        Self {
            bytes,
            file_name,
            declared_mime: None,
        }
    }

    pub fn with_mime(mut self, mime: &'a str) -> Self {
        self.declared_mime = Some(mime);
        self
    }
}

/// Turns uploaded spreadsheet or delimited-text bytes into a dataset.
///
/// Ingestion is pure: the returned dataset is not registered anywhere.
#[derive(Clone, Debug, Default)]
pub struct IngestService {
    config: SheetchartConfig,
}

impl IngestService {
    pub fn new(config: SheetchartConfig) -> Self {
        Self { config }
    }

    pub fn ingest(&self, upload: Upload<'_>, owner_id: OwnerId) -> IngestResult<TabularDataset> {
        let file_name = upload.file_name;
        let format = detect_file_format(file_name, upload.declared_mime, upload.bytes)?;

        let limit = self.config.max_upload_bytes;
        if upload.bytes.len() > limit {
            return Err(IngestError::Oversize {
                size: upload.bytes.len(),
                limit,
            });
        }

        if upload.bytes.is_empty() {
            return Err(IngestError::EmptyFile {
                file_name: file_name.to_string(),
            });
        }

        info!(
            "Ingesting {} as {} ({} bytes)",
            file_name,
            format,
            upload.bytes.len()
        );

        let grid = match format {
            FileFormat::Csv => self.read_delimited(upload.bytes, file_name)?,
            FileFormat::Xlsx => read_workbook::<Xlsx<_>>(upload.bytes, file_name)?,
            FileFormat::Xls => read_workbook::<Xls<_>>(upload.bytes, file_name)?,
        };

        let dataset = build_dataset(grid, file_name, owner_id)?;
        info!(
            "Ingested {} with {} rows and {} columns",
            file_name,
            dataset.row_count(),
            dataset.column_count()
        );
        Ok(dataset)
    }

    fn read_delimited(&self, raw: &[u8], file_name: &str) -> IngestResult<Vec<Vec<CellValue>>> {
        let delimiter = self
            .config
            .csv_delimiter_byte()
            .map_err(|e| IngestError::parse(file_name, e))?;
        let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(raw);

        let mut grid = Vec::new();
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {
                    // header text is kept exactly as written
                    let to_cell: fn(&str) -> CellValue = if grid.is_empty() {
                        text_cell
                    } else {
                        delimited_cell
                    };
                    grid.push(record.iter().map(to_cell).collect());
                }
                Ok(false) => break,
                Err(e) => return Err(IngestError::parse(file_name, e)),
            }
        }

        debug!("Read {} delimited rows from {}", grid.len(), file_name);
        Ok(grid)
    }
}

/// Decode the first sheet of a workbook into a cell grid.
fn read_workbook<'a, R>(raw: &'a [u8], file_name: &str) -> IngestResult<Vec<Vec<CellValue>>>
where
    R: Reader<Cursor<&'a [u8]>>,
{
    let mut workbook: R = open_workbook_from_rs(Cursor::new(raw))
        .map_err(|e| IngestError::parse(file_name, format!("{:?}", e)))?;

    let range: Range<Data> = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(IngestError::parse(file_name, format!("{:?}", e))),
        None => {
            return Err(IngestError::EmptyFile {
                file_name: file_name.to_string(),
            })
        }
    };

    debug!(
        "First sheet of {} is {}x{}",
        file_name,
        range.height(),
        range.width()
    );

    Ok(range
        .rows()
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect())
}

/// Split the grid into header and data rows. Header cells are always text,
/// numeric headers print without a trailing ".0".
fn build_dataset(
    grid: Vec<Vec<CellValue>>,
    file_name: &str,
    owner_id: OwnerId,
) -> IngestResult<TabularDataset> {
    let mut rows = grid.into_iter();
    let header = rows.next().ok_or_else(|| IngestError::EmptyFile {
        file_name: file_name.to_string(),
    })?;

    let columns = header.iter().map(CellValue::to_string).collect();
    Ok(TabularDataset::from_grid(
        file_name,
        owner_id,
        columns,
        rows.collect(),
    ))
}

fn text_cell(value: &str) -> CellValue {
    if value.is_empty() {
        CellValue::Missing
    } else {
        CellValue::String(value.to_string())
    }
}

/// Delimited text carries no types: a cell that is entirely a finite
/// decimal becomes a number, anything else stays text.
fn delimited_cell(value: &str) -> CellValue {
    match parse_decimal_exact(value) {
        Some(n) => CellValue::Number(n),
        None => text_cell(value),
    }
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => text_cell(s),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::String(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => text_cell(s),
        Data::Error(_) | Data::Empty => CellValue::Missing,
    }
}
