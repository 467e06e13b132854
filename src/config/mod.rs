pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

// 不帶任何參數執行時沿用固定路徑
pub const DEFAULT_INPUT_PATH: &str = "./LLM-3_runs_dataonly_test.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "extracted_ulcer_parameters.csv";
pub const DEFAULT_NOTE_COLUMN: &str = "note";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = crate::adapters::ollama::DEFAULT_OLLAMA_ENDPOINT;
pub const DEFAULT_MODEL: &str = "llama3.2:1b";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "ulcer-etl")]
#[command(about = "Extract corneal ulcer parameters from clinical notes with a local Ollama model")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    pub input_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_NOTE_COLUMN)]
    pub note_column: String,

    #[arg(long, default_value = DEFAULT_OLLAMA_ENDPOINT)]
    pub ollama_endpoint: String,

    /// Model must already be pulled (`ollama pull <model>`)
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Check input and model availability without running inference")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn note_column(&self) -> &str {
        &self.note_column
    }

    fn ollama_endpoint(&self) -> &str {
        &self.ollama_endpoint
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input_path", &self.input_path)?;
        validation::validate_file_extension("input_path", &self.input_path, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_extension("output_path", &self.output_path, &["csv"])?;
        validation::validate_non_empty_string("note_column", &self.note_column)?;
        validation::validate_url("ollama_endpoint", &self.ollama_endpoint)?;
        validation::validate_non_empty_string("model", &self.model)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_paths() {
        let config = CliConfig::parse_from(["ulcer-etl"]);

        assert_eq!(config.input_path(), "./LLM-3_runs_dataonly_test.csv");
        assert_eq!(config.output_path(), "extracted_ulcer_parameters.csv");
        assert_eq!(config.note_column(), "note");
        assert_eq!(config.ollama_endpoint(), "http://localhost:11434");
        assert_eq!(config.model(), "llama3.2:1b");
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_are_validated() {
        let config = CliConfig::parse_from([
            "ulcer-etl",
            "--input-path",
            "notes.xlsx",
            "--model",
            "llama3.2:3b",
        ]);
        assert_eq!(config.model(), "llama3.2:3b");
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["ulcer-etl", "--ollama-endpoint", "not a url"]);
        assert!(config.validate().is_err());
    }
}
