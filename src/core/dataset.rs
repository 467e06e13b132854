use crate::domain::model::Note;
use crate::utils::error::{EtlError, Result};
use std::io::Cursor;

const UTF8_BOM: char = '\u{feff}';

/// 依檔案順序逐列讀出筆記，只能走訪一次
///
/// 欄位檢查在建構時完成，缺少筆記欄位會在處理任何一列之前就失敗。
pub struct NoteReader {
    records: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
    column_index: usize,
    next_id: usize,
}

impl NoteReader {
    pub fn from_bytes(data: Vec<u8>, column: &str, source: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(Cursor::new(data));

        let headers = reader.headers()?;
        let column_index = headers
            .iter()
            .enumerate()
            .position(|(index, header)| {
                let header = if index == 0 {
                    header.trim_start_matches(UTF8_BOM)
                } else {
                    header
                };
                header == column
            })
            .ok_or_else(|| EtlError::MissingColumnError {
                path: source.to_string(),
                column: column.to_string(),
            })?;

        tracing::debug!(
            "Using column '{}' (index {}) from {}",
            column,
            column_index,
            source
        );

        Ok(Self {
            records: reader.into_records(),
            column_index,
            next_id: 1,
        })
    }
}

impl Iterator for NoteReader {
    type Item = Result<Note>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(EtlError::CsvError(e))),
        };

        let note_id = self.next_id;
        self.next_id += 1;

        // 欄位數不足的列視為空白筆記
        let text = record.get(self.column_index).unwrap_or_default().to_string();
        Some(Ok(Note { note_id, text }))
    }
}
