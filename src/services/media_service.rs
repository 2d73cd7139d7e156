// src/services/media_service.rs
//
// Upload/remoção de imagens no object store (API REST estilo Supabase Storage).

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::user::Caller,
    services::permissions::{authorize, Action},
};

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
pub const ALLOWED_TYPES: [&str; 5] = ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"];
pub const DEFAULT_FOLDER: &str = "images";
const DEFAULT_EXTENSION: &str = "jpg";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    fn public_url(&self, path: &str) -> String;

    /// Nunca sobrescreve um objeto existente.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    async fn remove(&self, path: &str) -> Result<(), AppError>;
}

pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, service_key: &str, bucket: &str) -> Result<Self, AppError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    async fn check(response: reqwest::Response) -> Result<(), AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::StorageError(format!("{status}: {body}")))
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, path)
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn remove(&self, path: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(format!("{}/storage/v1/object/{}", self.base_url, self.bucket))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await?;
        Self::check(response).await
    }
}

/// Arquivo já lido do multipart.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn normalize_folder(folder: Option<&str>) -> Result<String, AppError> {
    let folder = folder.map(|f| f.trim().trim_matches('/')).unwrap_or_default();
    if folder.is_empty() {
        return Ok(DEFAULT_FOLDER.to_string());
    }
    let valid = folder.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });
    if !valid {
        return Err(AppError::InvalidFolder);
    }
    Ok(folder.to_string())
}

/// `<pasta>/<millis>-<aleatório>.<ext>`
pub fn object_path(folder: &str, file_name: Option<&str>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}-{}.{}",
        folder,
        Utc::now().timestamp_millis(),
        &random[..13],
        extension_of(file_name)
    )
}

/// Caminho do objeto dentro do bucket, a partir da URL pública.
pub fn storage_path(file_url: &str, bucket: &str) -> Result<String, AppError> {
    let url = Url::parse(file_url).map_err(|_| AppError::InvalidFileUrl)?;
    let segments: Vec<&str> = url.path_segments().ok_or(AppError::InvalidFileUrl)?.collect();

    let bucket_index = segments
        .iter()
        .position(|s| *s == bucket)
        .ok_or(AppError::InvalidFileUrl)?;

    let rest = &segments[bucket_index + 1..];
    if rest.is_empty() || rest.iter().all(|s| s.is_empty()) {
        return Err(AppError::InvalidFileUrl);
    }
    Ok(rest.join("/"))
}

#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn ObjectStore>,
}

impl MediaService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn upload_file(
        &self,
        caller: &Caller,
        file: Option<FileUpload>,
        folder: Option<&str>,
    ) -> Result<String, AppError> {
        let user = caller.require()?;
        authorize(user, Action::ManageMedia)?;

        let file = file.ok_or(AppError::MissingFile)?;
        if !ALLOWED_TYPES.contains(&file.content_type.as_str()) {
            return Err(AppError::InvalidFileType(file.content_type));
        }
        if file.bytes.len() > MAX_FILE_SIZE {
            return Err(AppError::FileTooLarge);
        }

        let folder = normalize_folder(folder)?;
        let path = object_path(&folder, file.file_name.as_deref());

        self.store.put(&path, file.bytes, &file.content_type).await?;
        tracing::info!("🖼️ Arquivo {} enviado por {}", path, user.id);

        Ok(self.store.public_url(&path))
    }

    pub async fn delete_file(&self, caller: &Caller, file_url: &str) -> Result<(), AppError> {
        let user = caller.require()?;
        authorize(user, Action::ManageMedia)?;

        let path = storage_path(file_url, self.store.bucket())?;
        self.store.remove(&path).await?;
        tracing::info!("🗑️ Arquivo {} removido por {}", path, user.id);
        Ok(())
    }
}
