use std::time::Duration;

/// How long a successful upload stays on screen before the dialog closes itself.
pub const AUTO_CLOSE_DELAY: Duration = Duration::from_millis(1_500);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Succeeded,
    Failed(String),
}

impl UploadStatus {
    pub fn message(&self) -> Option<String> {
        match self {
            UploadStatus::Idle => None,
            UploadStatus::Uploading => Some("Uploading image and saving metadata...".to_string()),
            UploadStatus::Succeeded => {
                Some("Upload successful! Image added to gallery.".to_string())
            }
            UploadStatus::Failed(reason) => Some(format!("Error uploading image: {reason}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub file: Option<SelectedFile>,
    pub tags: String,
    pub element: String,
}

/// Payload handed to the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub tags: String,
    pub element: String,
}

#[derive(Debug, Clone, Default)]
pub struct UploadDialog {
    open: bool,
    form: UploadForm,
    status: UploadStatus,
}

impl UploadDialog {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the dialog and resets the form and status.
    pub fn close(&mut self) {
        self.open = false;
        self.form = UploadForm::default();
        self.status = UploadStatus::Idle;
    }

    pub fn click_backdrop(&mut self) {
        self.close();
    }

    pub fn form(&self) -> &UploadForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UploadForm {
        &mut self.form
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn submit_enabled(&self) -> bool {
        matches!(self.status, UploadStatus::Idle | UploadStatus::Failed(_))
    }

    pub fn submit_label(&self) -> &'static str {
        match self.status {
            UploadStatus::Idle => "Upload Image",
            UploadStatus::Uploading | UploadStatus::Succeeded => "Uploading...",
            UploadStatus::Failed(_) => "Try Again",
        }
    }

    /// Starts a submission. Returns `None` without a selected file or while disabled.
    pub fn begin_submit(&mut self) -> Option<UploadRequest> {
        if !self.submit_enabled() {
            return None;
        }
        let file = self.form.file.as_ref()?;
        let request = UploadRequest {
            file_name: file.name.clone(),
            bytes: file.bytes.clone(),
            tags: self.form.tags.trim().to_string(),
            element: self.form.element.clone(),
        };
        self.status = UploadStatus::Uploading;
        Some(request)
    }

    /// After a successful upload, waits [`AUTO_CLOSE_DELAY`] and closes the dialog.
    ///
    /// Returns false without waiting when the last upload did not succeed.
    pub async fn close_after_success(&mut self) -> bool {
        if self.status != UploadStatus::Succeeded {
            return false;
        }
        tokio::time::sleep(AUTO_CLOSE_DELAY).await;
        self.close();
        true
    }

    pub fn finish(&mut self, result: Result<(), String>) {
        self.status = match result {
            Ok(()) => UploadStatus::Succeeded,
            Err(reason) => UploadStatus::Failed(reason),
        };
    }
}
