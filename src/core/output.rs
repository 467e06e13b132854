use crate::domain::model::{ExtractedRecord, OUTPUT_COLUMNS};
use crate::utils::error::{EtlError, Result};

/// 把結果集合轉成 CSV；沒有成功的列時仍輸出表頭
pub fn records_to_csv(records: &[ExtractedRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e.error()),
    })
}
