use serde::{Deserialize, Serialize};

/// 輸入資料表中的一筆臨床紀錄，`note_id` 從 1 開始
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub note_id: usize,
    pub text: String,
}

/// 模型回應經驗證後的三項潰瘍參數
///
/// 代碼語意上只有 1 (陽性)、0 (陰性)、9 (未提及)，但驗證只限制在 [0, 9]。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UlcerParameters {
    pub ulcer_centrality: u8,
    pub reason_for_ulcer_centrality: String,
    pub ulcer_depth: u8,
    pub reason_for_ulcer_depth: String,
    pub corneal_thinning: u8,
    pub reason_for_corneal_thinning: String,
}

/// 輸出 CSV 的一列；欄位順序即輸出欄位順序
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    pub ulcer_centrality: u8,
    pub reason_for_ulcer_centrality: String,
    pub ulcer_depth: u8,
    pub reason_for_ulcer_depth: String,
    pub corneal_thinning: u8,
    pub reason_for_corneal_thinning: String,
    pub note_id: usize,
    pub note: String,
}

impl ExtractedRecord {
    pub fn new(params: UlcerParameters, note: Note) -> Self {
        Self {
            ulcer_centrality: params.ulcer_centrality,
            reason_for_ulcer_centrality: params.reason_for_ulcer_centrality,
            ulcer_depth: params.ulcer_depth,
            reason_for_ulcer_depth: params.reason_for_ulcer_depth,
            corneal_thinning: params.corneal_thinning,
            reason_for_corneal_thinning: params.reason_for_corneal_thinning,
            note_id: note.note_id,
            note: note.text,
        }
    }
}

pub const OUTPUT_COLUMNS: [&str; 8] = [
    "ulcer_centrality",
    "reason_for_ulcer_centrality",
    "ulcer_depth",
    "reason_for_ulcer_depth",
    "corneal_thinning",
    "reason_for_corneal_thinning",
    "note_id",
    "note",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// 送往推論服務的單次請求
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub format: serde_json::Value,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, format: serde_json::Value) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            format,
            stream: false,
        }
    }
}

/// 單列失敗的紀錄，只用於回報，不會寫入輸出檔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub note_id: usize,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub records: Vec<ExtractedRecord>,
    pub processed_count: usize,
    pub failures: Vec<RowFailure>,
}

impl TransformResult {
    pub fn total_rows(&self) -> usize {
        self.processed_count + self.failures.len()
    }
}
