//! Buffered `multipart/form-data` bodies.
//!
//! Podcast and episode uploads arrive as a handful of text fields plus one
//! binary part. The whole body is read up front (it is already capped by the
//! router's body limit) and then picked apart by name.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct UploadForm {
  fields: HashMap<String, String>,
  files:  HashMap<String, Vec<u8>>,
}

impl UploadForm {
  /// Drain `multipart`. Parts with a filename are kept as bytes, all others
  /// as UTF-8 text; unnamed parts are skipped.
  pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
    let mut form = Self::default();

    while let Some(field) = multipart
      .next_field()
      .await
      .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
      let Some(name) = field.name().map(str::to_owned) else {
        continue;
      };
      if field.file_name().is_some() {
        let bytes = field
          .bytes()
          .await
          .map_err(|e| ApiError::BadRequest(format!("unreadable file {name:?}: {e}")))?;
        form.files.insert(name, bytes.to_vec());
      } else {
        let text = field
          .text()
          .await
          .map_err(|e| ApiError::BadRequest(format!("unreadable field {name:?}: {e}")))?;
        form.fields.insert(name, text);
      }
    }

    Ok(form)
  }

  /// A text field, treating blank values as absent.
  pub fn text(&self, name: &str) -> Option<String> {
    self
      .fields
      .get(name)
      .map(|v| v.trim())
      .filter(|v| !v.is_empty())
      .map(str::to_owned)
  }

  pub fn require_text(&self, name: &str) -> Result<String, ApiError> {
    self
      .text(name)
      .ok_or_else(|| ApiError::BadRequest(format!("{name} field is mandatory")))
  }

  /// A file part; empty uploads count as absent.
  pub fn take_file(&mut self, name: &str) -> Option<Vec<u8>> {
    self.files.remove(name).filter(|b| !b.is_empty())
  }

  pub fn require_file(&mut self, name: &str) -> Result<Vec<u8>, ApiError> {
    self
      .take_file(name)
      .ok_or_else(|| ApiError::BadRequest(format!("{name} file is mandatory")))
  }
}
