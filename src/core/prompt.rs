/// 角膜潰瘍判讀指示；文字需與既有輸出保持可比較，不可改寫
pub const ULCER_PROMPT_TEMPLATE: &str = include_str!("ulcer_prompt.txt");

pub const NOTE_PLACEHOLDER: &str = "{note}";

/// 將筆記原文代入模板的 `{note}`，不做任何跳脫
pub fn render_prompt(template: &str, note: &str) -> String {
    template.replacen(NOTE_PLACEHOLDER, note, 1)
}

pub fn build_prompt(note: &str) -> String {
    render_prompt(ULCER_PROMPT_TEMPLATE, note)
}
