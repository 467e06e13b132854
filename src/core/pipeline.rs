use crate::core::dataset::NoteReader;
use crate::core::output::records_to_csv;
use crate::core::prompt::build_prompt;
use crate::core::validator::{ulcer_parameters_schema, ResultCollection, RowOutcome};
use crate::core::{ConfigProvider, InferenceClient, Pipeline, Storage, TransformResult};
use crate::domain::model::ChatRequest;
use crate::utils::error::Result;

/// 逐列抽取角膜潰瘍參數：讀檔 → 組 prompt → 推論 → 驗證累積 → 寫出 CSV
pub struct UlcerPipeline<S: Storage, C: ConfigProvider, L: InferenceClient> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: L,
}

impl<S: Storage, C: ConfigProvider, L: InferenceClient> UlcerPipeline<S, C, L> {
    pub fn new(storage: S, config: C, client: L) -> Self {
        Self {
            storage,
            config,
            client,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, L: InferenceClient> Pipeline for UlcerPipeline<S, C, L> {
    type Notes = NoteReader;

    async fn extract(&self) -> Result<NoteReader> {
        let input_path = self.config.input_path();
        tracing::info!("📂 Loading notes from: {}", input_path);

        let data = self.storage.read_file(input_path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), input_path);

        NoteReader::from_bytes(data, self.config.note_column(), input_path)
    }

    async fn transform(&self, notes: NoteReader) -> Result<TransformResult> {
        let schema = ulcer_parameters_schema();
        let mut collection = ResultCollection::new();

        for note in notes {
            let note = note?;
            let request = ChatRequest::new(self.config.model(), build_prompt(&note.text), schema.clone());

            // 服務錯誤直接往上拋，整個批次中止
            let raw = self.client.chat(&request).await?;
            tracing::debug!("Raw response for note {}: {}", note.note_id, raw);

            let outcome = collection.accept(note, &raw);
            match &outcome {
                RowOutcome::Accumulated { note_id } => {
                    tracing::debug!("✅ Note {} accumulated", note_id);
                }
                RowOutcome::Failed { note_id, error } => {
                    tracing::warn!("⚠️ Skipping note {}: {}", note_id, error);
                }
            }
            println!("{}", outcome);
        }

        tracing::info!(
            "🔧 Transform complete: {} succeeded, {} failed",
            collection.processed_count(),
            collection.failures().len()
        );
        Ok(collection.into_result())
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path().to_string();
        let csv_data = records_to_csv(&result.records)?;

        tracing::debug!(
            "Writing {} records ({} bytes) to {}",
            result.records.len(),
            csv_data.len(),
            output_path
        );
        self.storage.write_file(&output_path, &csv_data).await?;

        tracing::info!("💾 Results saved: {}", output_path);
        Ok(output_path)
    }
}
