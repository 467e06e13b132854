use crate::adapters::ollama::OllamaClient;
use crate::core::dataset::NoteReader;
use crate::core::prompt::build_prompt;
use crate::core::{ConfigProvider, Storage};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct DryRunReport {
    pub input_path: String,
    pub note_count: usize,
    pub empty_notes: usize,
    pub first_prompt: Option<String>,
    pub model: String,
    /// `None` 代表連不上 Ollama
    pub model_available: Option<bool>,
}

/// 檢查資料集與模型是否就緒，不做任何推論
pub async fn dry_run<S: Storage, C: ConfigProvider>(
    storage: &S,
    config: &C,
    client: &OllamaClient,
) -> Result<DryRunReport> {
    let data = storage.read_file(config.input_path()).await?;
    let notes = NoteReader::from_bytes(data, config.note_column(), config.input_path())?;

    let mut note_count = 0;
    let mut empty_notes = 0;
    let mut first_prompt = None;
    for note in notes {
        let note = note?;
        if note.text.trim().is_empty() {
            empty_notes += 1;
        }
        if first_prompt.is_none() {
            first_prompt = Some(build_prompt(&note.text));
        }
        note_count += 1;
    }

    let model_available = match client.has_model(config.model()).await {
        Ok(available) => Some(available),
        Err(e) => {
            tracing::warn!("⚠️ Could not reach Ollama at {}: {}", client.endpoint(), e);
            None
        }
    };

    Ok(DryRunReport {
        input_path: config.input_path().to_string(),
        note_count,
        empty_notes,
        first_prompt,
        model: config.model().to_string(),
        model_available,
    })
}

impl DryRunReport {
    pub fn print(&self) {
        println!("🔍 Dry Run Analysis:");
        println!("  Input: {}", self.input_path);
        println!("  Notes: {} ({} empty)", self.note_count, self.empty_notes);
        if let Some(prompt) = &self.first_prompt {
            println!("  First prompt: {} characters", prompt.chars().count());
        }
        match self.model_available {
            Some(true) => println!("  Model '{}': available", self.model),
            Some(false) => println!(
                "  Model '{}': NOT pulled, run `ollama pull {}`",
                self.model, self.model
            ),
            None => println!("  Model '{}': Ollama unreachable", self.model),
        }
    }
}
