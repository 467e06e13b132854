pub mod dataset;
pub mod etl;
pub mod output;
pub mod pipeline;
pub mod preflight;
pub mod prompt;
pub mod validator;

pub use crate::domain::model::{ExtractedRecord, Note, TransformResult};
pub use crate::domain::ports::{ConfigProvider, InferenceClient, Pipeline, Storage};
pub use crate::utils::error::Result;
