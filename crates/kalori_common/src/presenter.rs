//! Result presenter - outcome to alert text

use crate::upload::UploadOutcome;

pub const RESULT_TITLE: &str = "Hasil Analisis";
pub const ERROR_TITLE: &str = "Error";
pub const ERROR_MESSAGE: &str = "Gagal mengupload atau memproses gambar";

/// Text under the progress indicator while an upload is in flight
pub const LOADING_MESSAGE: &str = "Menganalisa foto...";

/// A modal message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Map an outcome to the alert shown to the user.
///
/// Every failure kind yields the same alert.
pub fn present(outcome: &UploadOutcome) -> Alert {
    match outcome {
        UploadOutcome::Success(result) => Alert {
            title: RESULT_TITLE.to_string(),
            message: format!(
                "Makanan: {}\nKalori: {}",
                result.food_name,
                result.calorie_text()
            ),
        },
        UploadOutcome::Failure(_) => Alert {
            title: ERROR_TITLE.to_string(),
            message: ERROR_MESSAGE.to_string(),
        },
    }
}
