use crate::domain::model::{ChatRequest, Note, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn note_column(&self) -> &str;
    fn ollama_endpoint(&self) -> &str;
    fn model(&self) -> &str;
}

/// 推論服務邊界：送出一個 prompt 與輸出 schema，取回模型的原始文字
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Notes: Iterator<Item = Result<Note>> + Send;

    async fn extract(&self) -> Result<Self::Notes>;
    async fn transform(&self, notes: Self::Notes) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
