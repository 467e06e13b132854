use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub processed: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
}

impl RunSummary {
    /// 只計算逐列處理的時間，不含寫檔
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }
}

/// 整批結束後印出的耗時摘要
pub fn summary_line(minutes: f64) -> String {
    format!("Total processing time for the dataset: {:.2} minutes.", minutes)
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        tracing::info!("🚀 Starting ulcer parameter extraction at {}", started_at.to_rfc3339());
        self.monitor.log_stats("Start");

        // Extract：缺檔或缺欄位會在這裡就中止
        let notes = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        // Transform：計時範圍只涵蓋逐列處理
        let timer = Instant::now();
        let result = self.pipeline.transform(notes).await?;
        let elapsed = timer.elapsed();
        self.monitor.log_stats("Transform");

        let processed = result.processed_count;
        let failed = result.failures.len();
        let summary_minutes = elapsed.as_secs_f64() / 60.0;
        println!("\n{}", summary_line(summary_minutes));
        tracing::info!(
            "📊 {} of {} notes extracted in {:.2} minutes",
            processed,
            result.total_rows(),
            summary_minutes
        );

        // Load：整批只在最後寫出一次
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            output_path,
            processed,
            failed,
            elapsed,
            started_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Note, RowFailure, TransformResult};
    use crate::utils::error::EtlError;
    use std::sync::Mutex;

    struct StubPipeline {
        notes: usize,
        fail_load: bool,
        loaded: Mutex<Option<usize>>,
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        type Notes = std::vec::IntoIter<Result<Note>>;

        async fn extract(&self) -> Result<Self::Notes> {
            let notes: Vec<Result<Note>> = (1..=self.notes)
                .map(|note_id| {
                    Ok(Note {
                        note_id,
                        text: format!("note {}", note_id),
                    })
                })
                .collect();
            Ok(notes.into_iter())
        }

        async fn transform(&self, notes: Self::Notes) -> Result<TransformResult> {
            let mut result = TransformResult::default();
            for note in notes {
                let note = note?;
                if note.note_id % 2 == 0 {
                    result.failures.push(RowFailure {
                        note_id: note.note_id,
                        detail: "bad".to_string(),
                    });
                } else {
                    result.processed_count += 1;
                }
            }
            Ok(result)
        }

        async fn load(&self, result: TransformResult) -> Result<String> {
            if self.fail_load {
                return Err(EtlError::ProcessingError {
                    message: "disk full".to_string(),
                });
            }
            *self.loaded.lock().unwrap() = Some(result.processed_count);
            Ok("out.csv".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_reports_tally_and_elapsed() {
        let engine = EtlEngine::new(StubPipeline {
            notes: 5,
            fail_load: false,
            loaded: Mutex::new(None),
        });

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.output_path, "out.csv");
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.failed, 2);
        assert!(summary.elapsed_minutes() >= 0.0);
        assert_eq!(*engine.pipeline.loaded.lock().unwrap(), Some(3));
    }

    #[test]
    fn test_summary_line_rounds_to_two_decimals() {
        assert_eq!(
            summary_line(2.0 / 3.0),
            "Total processing time for the dataset: 0.67 minutes."
        );
        assert_eq!(
            summary_line(0.0),
            "Total processing time for the dataset: 0.00 minutes."
        );
        assert_eq!(
            summary_line(12.5),
            "Total processing time for the dataset: 12.50 minutes."
        );
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let engine = EtlEngine::new(StubPipeline {
            notes: 1,
            fail_load: true,
            loaded: Mutex::new(None),
        });

        assert!(engine.run().await.is_err());
    }
}
