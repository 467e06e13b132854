use crate::domain::model::{ExtractedRecord, Note, RowFailure, TransformResult, UlcerParameters};
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

pub const CODE_MIN: i64 = 0;
pub const CODE_MAX: i64 = 9;

const CODED_FIELDS: [&str; 3] = ["ulcer_centrality", "ulcer_depth", "corneal_thinning"];
const REASON_FIELDS: [&str; 3] = [
    "reason_for_ulcer_centrality",
    "reason_for_ulcer_depth",
    "reason_for_corneal_thinning",
];

/// 單一欄位不符合 schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub field: String,
    pub reason: String,
}

impl SchemaViolation {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for SchemaViolation {}

/// 可恢復的單列錯誤；只會被記錄並跳過該列
#[derive(Error, Debug)]
pub enum RowError {
    #[error("response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response failed schema validation: {0}")]
    Schema(#[from] SchemaViolation),
}

#[derive(Debug)]
pub enum RowOutcome {
    Accumulated { note_id: usize },
    Failed { note_id: usize, error: RowError },
}

impl RowOutcome {
    pub fn note_id(&self) -> usize {
        match self {
            RowOutcome::Accumulated { note_id } | RowOutcome::Failed { note_id, .. } => *note_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Accumulated { .. })
    }
}

/// 每列處理完印到 console 的那一行
impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOutcome::Accumulated { note_id } => {
                write!(f, "Processed note ID {} successfully.", note_id)
            }
            RowOutcome::Failed { note_id, error } => {
                write!(f, "Failed to process note ID {}: {}", note_id, error)
            }
        }
    }
}

/// 請模型遵守的輸出 schema (與 `UlcerParameters` 一致)
pub fn ulcer_parameters_schema() -> Value {
    let coded = |title: &str| {
        json!({
            "maximum": CODE_MAX,
            "minimum": CODE_MIN,
            "title": title,
            "type": "integer"
        })
    };
    let reason = |title: &str| json!({ "title": title, "type": "string" });

    json!({
        "properties": {
            "ulcer_centrality": coded("Ulcer Centrality"),
            "reason_for_ulcer_centrality": reason("Reason For Ulcer Centrality"),
            "ulcer_depth": coded("Ulcer Depth"),
            "reason_for_ulcer_depth": reason("Reason For Ulcer Depth"),
            "corneal_thinning": coded("Corneal Thinning"),
            "reason_for_corneal_thinning": reason("Reason For Corneal Thinning")
        },
        "required": [
            "ulcer_centrality",
            "reason_for_ulcer_centrality",
            "ulcer_depth",
            "reason_for_ulcer_depth",
            "corneal_thinning",
            "reason_for_corneal_thinning"
        ],
        "title": "UlcerParameters",
        "type": "object"
    })
}

pub fn parse_response(raw: &str) -> Result<Value, RowError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn validate_parameters(value: &Value) -> Result<UlcerParameters, SchemaViolation> {
    let object = value.as_object().ok_or_else(|| {
        SchemaViolation::new(
            "response",
            format!("expected a JSON object, got {}", describe(value)),
        )
    })?;

    // 先檢查必填欄位，錯誤訊息才會指向第一個缺少的欄位
    for field in CODED_FIELDS.iter().chain(REASON_FIELDS.iter()) {
        if !object.contains_key(*field) {
            return Err(SchemaViolation::new(field, "field required"));
        }
    }

    Ok(UlcerParameters {
        ulcer_centrality: coded_value(object, "ulcer_centrality")?,
        reason_for_ulcer_centrality: reason_value(object, "reason_for_ulcer_centrality")?,
        ulcer_depth: coded_value(object, "ulcer_depth")?,
        reason_for_ulcer_depth: reason_value(object, "reason_for_ulcer_depth")?,
        corneal_thinning: coded_value(object, "corneal_thinning")?,
        reason_for_corneal_thinning: reason_value(object, "reason_for_corneal_thinning")?,
    })
}

pub fn validate_response(raw: &str) -> Result<UlcerParameters, RowError> {
    let value = parse_response(raw)?;
    Ok(validate_parameters(&value)?)
}

fn coded_value(object: &Map<String, Value>, field: &str) -> Result<u8, SchemaViolation> {
    let value = &object[field];
    // 寬鬆轉型：true/false、9.0、"1"、"1.0"、" 2 " 都視為整數
    let code = match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(whole_number)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    }
    .ok_or_else(|| {
        SchemaViolation::new(field, format!("expected an integer, got {}", describe(value)))
    })?;

    if !(CODE_MIN..=CODE_MAX).contains(&code) {
        // 超出 i64 的數字轉型會飽和，訊息改用原始文字
        let shown = match value {
            Value::String(text) => text.trim().to_string(),
            other => other.to_string(),
        };
        return Err(SchemaViolation::new(
            field,
            format!("value {} is outside [{}, {}]", shown, CODE_MIN, CODE_MAX),
        ));
    }

    Ok(code as u8)
}

fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then(|| f as i64)
}

fn reason_value(object: &Map<String, Value>, field: &str) -> Result<String, SchemaViolation> {
    match &object[field] {
        Value::String(text) => Ok(text.clone()),
        other => Err(SchemaViolation::new(
            field,
            format!("expected a string, got {}", describe(other)),
        )),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// 只增不改的結果集合，由 transform 階段持有並在結束時交給 load
#[derive(Debug, Default)]
pub struct ResultCollection {
    records: Vec<ExtractedRecord>,
    processed_count: usize,
    failures: Vec<RowFailure>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, note: Note, raw: &str) -> RowOutcome {
        let note_id = note.note_id;
        match validate_response(raw) {
            Ok(params) => {
                self.records.push(ExtractedRecord::new(params, note));
                self.processed_count += 1;
                RowOutcome::Accumulated { note_id }
            }
            Err(error) => {
                self.failures.push(RowFailure {
                    note_id,
                    detail: error.to_string(),
                });
                RowOutcome::Failed { note_id, error }
            }
        }
    }

    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }

    pub fn into_result(self) -> TransformResult {
        TransformResult {
            records: self.records,
            processed_count: self.processed_count,
            failures: self.failures,
        }
    }
}
