use super::*;
use serde::Deserialize;

/// Page-level settings shared by the form state store and the navigation
/// guard. Every field has a default matching the survey pages, so a JSON
/// config only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// `id` of the form container wired for autosave.
    pub form_id: String,
    /// Prefix of per-form storage keys: `<prefix><identity>_form<N>`.
    pub storage_key_prefix: String,
    /// Suffix marking a snapshot key as canvas image data.
    pub canvas_image_suffix: String,
    /// Mime type requested when exporting canvas rasters.
    pub canvas_mime: String,
    /// Attribute carrying a structured next-page reference.
    pub next_page_attr: String,
    pub error_class: String,
    pub message_class: String,
    pub summary_class: String,
    pub field_message: String,
    pub summary_message: String,
    pub label_markers: LabelMarkers,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            form_id: "surveyForm".into(),
            storage_key_prefix: "surveyData_".into(),
            canvas_image_suffix: "_image".into(),
            canvas_mime: "image/png".into(),
            next_page_attr: "data-next-page".into(),
            error_class: "error".into(),
            message_class: "error-message".into(),
            summary_class: "error-summary".into(),
            field_message: "この項目は必須です".into(),
            summary_message: "未回答の必須項目があります。赤枠の項目をご確認ください。".into(),
            label_markers: LabelMarkers::default(),
        }
    }
}

impl SurveyConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Label fragments that tell a forward control from a backward one.
/// Matched against NFKC-normalized, lowercased label text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LabelMarkers {
    pub forward: Vec<String>,
    pub back: Vec<String>,
}

impl Default for LabelMarkers {
    fn default() -> Self {
        let forward = ["次へ", "next", "→", "▶", ">", "»"];
        let back = ["戻る", "前へ", "back", "prev", "←", "◀", "<", "«"];
        Self {
            forward: forward.iter().map(|s| s.to_string()).collect(),
            back: back.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() -> Result<()> {
        let config = SurveyConfig::from_json(
            r#"{ "form_id": "questionnaire", "label_markers": { "forward": ["weiter"] } }"#,
        )?;
        assert_eq!(config.form_id, "questionnaire");
        assert_eq!(config.error_class, "error");
        assert_eq!(config.label_markers.forward, vec!["weiter".to_string()]);
        assert!(config.label_markers.back.contains(&"戻る".to_string()));
        Ok(())
    }

    #[test]
    fn malformed_json_is_a_snapshot_error() {
        assert!(matches!(
            SurveyConfig::from_json("{ form_id"),
            Err(Error::Snapshot(_))
        ));
    }
}
