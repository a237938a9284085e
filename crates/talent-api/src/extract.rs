//! Request extractors and multipart upload reading.

use axum::extract::multipart::Multipart;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use talent_models::validate_request;

use crate::error::{ApiError, ApiResult};

/// JSON body whose rejection is a 400 with the usual `{"detail"}` body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// JSON body that is validated before the handler sees it.
///
/// Malformed JSON and failed validation rules both reject with 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        validate_request(&value)?;
        Ok(Self(value))
    }
}

/// One file read from a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Read the form field named `field`, failing with 413 once it exceeds
/// `max_size` bytes.
pub async fn read_upload(multipart: &mut Multipart, field: &str, max_size: usize) -> ApiResult<UploadedFile> {
    while let Some(mut part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text())))?
    {
        if part.name() != Some(field) {
            continue;
        }

        let filename = part.file_name().map(str::to_string);
        let content_type = part.content_type().map(str::to_string);
        let mut data = Vec::new();
        while let Some(chunk) = part
            .chunk()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text())))?
        {
            if data.len() + chunk.len() > max_size {
                return Err(ApiError::PayloadTooLarge(format!(
                    "File exceeds the {} byte limit",
                    max_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }
        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Err(ApiError::bad_request(format!("Missing '{}' file field", field)))
}
