use crate::i18n::Language;
use providers::ProviderError;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputIssue {
    /// At least one selected file is not an accepted audio type.
    NotAudio { file: String },
    /// Submission with nothing selected.
    EmptyBatch,
}

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("{}", localized_input(.0, Language::En))]
    InputValidation(InputIssue),
    #[error("Error in analysis: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("Error in analysis: Connection to server failed (status {status})")]
    ConnectionFailed { status: u16 },
    #[error("Error in analysis: {0}")]
    ServerReported(String),
    #[error("the service classified {file} as {class:?}, which is not High, Mid or Low")]
    UnknownClass { file: String, class: String },
    #[error("No results to download.")]
    ExportPrecondition,
    #[error("report rendering failed: {0}")]
    Render(String),
    #[error("could not read the rendered report: {0}")]
    Scrape(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AssessmentError {
    /// Banner text in the active display language.
    pub fn localized(&self, lang: Language) -> String {
        match self {
            AssessmentError::InputValidation(issue) => localized_input(issue, lang).to_string(),
            AssessmentError::Transport(msg) | AssessmentError::ServerReported(msg) => {
                format!(
                    "{}{}",
                    lang.pick("เกิดข้อผิดพลาดในการวิเคราะห์: ", "Error in analysis: "),
                    msg
                )
            }
            AssessmentError::ConnectionFailed { .. } => format!(
                "{}{}",
                lang.pick("เกิดข้อผิดพลาดในการวิเคราะห์: ", "Error in analysis: "),
                lang.pick("การเชื่อมต่อกับเซิร์ฟเวอร์มีปัญหา", "Connection to server failed")
            ),
            AssessmentError::UnknownClass { file, class } => match lang {
                Language::Th => format!(
                    "เซิร์ฟเวอร์ส่งผลการจำแนก \"{class}\" สำหรับไฟล์ {file} ซึ่งไม่ใช่ High, Mid หรือ Low"
                ),
                Language::En => format!(
                    "The server classified {file} as \"{class}\", which is not High, Mid or Low."
                ),
            },
            AssessmentError::ExportPrecondition => lang
                .pick("ไม่มีผลลัพธ์ที่จะดาวน์โหลด", "No results to download.")
                .to_string(),
            AssessmentError::Render(msg) => format!(
                "{}{}",
                lang.pick("สร้างรายงานไม่สำเร็จ: ", "Could not build the report: "),
                msg
            ),
            AssessmentError::Scrape(msg) => format!(
                "{}{}",
                lang.pick("อ่านรายงานไม่สำเร็จ: ", "Could not read the report: "),
                msg
            ),
            AssessmentError::Io(err) => format!(
                "{}{}",
                lang.pick("เขียนไฟล์ไม่สำเร็จ: ", "Could not write file: "),
                err
            ),
        }
    }
}

fn localized_input(issue: &InputIssue, lang: Language) -> &'static str {
    match issue {
        InputIssue::NotAudio { .. } => lang.pick(
            "กรุณาเลือกเฉพาะไฟล์ WAV เท่านั้น",
            "Please select only WAV files.",
        ),
        InputIssue::EmptyBatch => {
            lang.pick("กรุณาเลือกอย่างน้อย 1 ไฟล์", "Please select at least 1 file.")
        }
    }
}

/// Warning shown when a selection is cut down to the first `max` files.
pub fn truncation_notice(max: usize, lang: Language) -> String {
    match lang {
        Language::Th => format!("จำกัดจำนวนไฟล์สูงสุด {max} ไฟล์ เลือกเฉพาะ {max} ไฟล์แรกเท่านั้น"),
        Language::En => format!(
            "Maximum {max} files allowed. Only the first {max} files will be processed."
        ),
    }
}

impl From<ProviderError> for AssessmentError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ServerReported(msg) => AssessmentError::ServerReported(msg),
            ProviderError::Status { status, message } => {
                warn!(status, body = %message, "classification service returned an error status");
                AssessmentError::ConnectionFailed { status }
            }
            other => AssessmentError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_follow_the_language() {
        let err = AssessmentError::InputValidation(InputIssue::EmptyBatch);
        assert_eq!(err.localized(Language::En), "Please select at least 1 file.");
        assert_eq!(err.localized(Language::Th), "กรุณาเลือกอย่างน้อย 1 ไฟล์");
        assert_eq!(err.to_string(), "Please select at least 1 file.");
    }

    #[test]
    fn server_reported_keeps_the_service_text() {
        let err: AssessmentError = ProviderError::ServerReported("bad file".into()).into();
        assert!(matches!(err, AssessmentError::ServerReported(_)));
        assert_eq!(err.localized(Language::En), "Error in analysis: bad file");
    }

    #[test]
    fn error_status_shows_the_connection_banner() {
        let err: AssessmentError = ProviderError::Status {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, AssessmentError::ConnectionFailed { status: 500 }));
        assert_eq!(
            err.localized(Language::En),
            "Error in analysis: Connection to server failed"
        );
        assert_eq!(
            err.localized(Language::Th),
            "เกิดข้อผิดพลาดในการวิเคราะห์: การเชื่อมต่อกับเซิร์ฟเวอร์มีปัญหา"
        );
        assert!(!err.localized(Language::En).contains("boom"));
    }

    #[test]
    fn unknown_class_names_the_service_as_the_source() {
        let err = AssessmentError::UnknownClass {
            file: "a.wav".into(),
            class: "Excellent".into(),
        };
        let text = err.localized(Language::En);
        assert!(text.starts_with("The server classified a.wav as \"Excellent\""));
        assert!(text.contains("not High, Mid or Low"));
    }

    #[test]
    fn truncation_notice_names_the_limit() {
        assert!(truncation_notice(10, Language::En).contains("Maximum 10 files"));
    }
}
