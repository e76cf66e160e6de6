use super::{SyncConfig, SyncError};
use crate::constants::{PHOTO_FILE_NAME, PHOTO_MIME_TYPE, USERS_ENDPOINT};
use crate::models::User;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Everything sent to the remote service for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub birth_day: String,
    pub gender: String,
    pub user_name: String,
    /// The stored credential, hashed unless the store runs in cleartext mode.
    pub password: String,
    pub photo: Option<Vec<u8>>,
}

impl UserUpload {
    /// Build the upload for `user`, reading the profile photo from disk.
    /// A photo that cannot be read is left out.
    pub async fn from_user(user: &User) -> Self {
        let photo = match user.photo_uri.as_deref() {
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!("Skipping unreadable photo {path} for user {}: {e}", user.user_name);
                    None
                }
            },
            None => None,
        };

        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            mobile_number: user.mobile_number.clone(),
            birth_day: user.birth_day.clone(),
            gender: user.gender.clone(),
            user_name: user.user_name.clone(),
            password: user.password.clone(),
            photo,
        }
    }

    fn into_form(self) -> Result<Form, SyncError> {
        let form = Form::new()
            .text("firstName", self.first_name)
            .text("lastName", self.last_name)
            .text("email", self.email)
            .text("mobileNumber", self.mobile_number)
            .text("birthDay", self.birth_day)
            .text("gender", self.gender)
            .text("userName", self.user_name)
            .text("password", self.password);

        match self.photo {
            Some(bytes) => {
                let part = Part::bytes(bytes)
                    .file_name(PHOTO_FILE_NAME)
                    .mime_str(PHOTO_MIME_TYPE)?;
                Ok(form.part("photo", part))
            }
            None => Ok(form),
        }
    }
}

/// The remote user service.
#[async_trait]
pub trait RemoteUsers: Send + Sync {
    /// Create the user remotely and return the id the server assigned.
    async fn create_user(&self, upload: UserUpload) -> Result<String, SyncError>;
}

/// `RemoteUsers` over HTTP: `POST {api_url}/api/users` as multipart form data.
///
/// The `password` part carries the credential as stored. Under the default
/// `PasswordStorage::Hashed` policy that is an argon2 PHC string, which the
/// server cannot use to log the user in; servers that authenticate with the
/// uploaded password need a store opened with `PasswordStorage::Cleartext`.
pub struct HttpRemote {
    client: Client,
    endpoint: Url,
}

impl HttpRemote {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let endpoint = config
            .api_url
            .join(USERS_ENDPOINT)
            .map_err(|source| SyncError::InvalidEndpoint {
                url: config.api_url.to_string(),
                source,
            })?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteUsers for HttpRemote {
    async fn create_user(&self, upload: UserUpload) -> Result<String, SyncError> {
        let user_name = upload.user_name.clone();
        let form = upload.into_form()?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(SyncError::Rejected { status, body });
        }

        debug!("Upload of {user_name} answered HTTP {status}");
        parse_remote_id(&body)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Text(String),
    Number(serde_json::Number),
}

/// Body of a successful create; other fields are ignored.
#[derive(Deserialize)]
struct CreatedUser {
    #[serde(rename = "_id")]
    object_id: Option<RemoteId>,
    id: Option<RemoteId>,
}

/// Read the server-assigned id from a JSON body, as `_id` or `id`.
pub(crate) fn parse_remote_id(body: &str) -> Result<String, SyncError> {
    let created: CreatedUser = serde_json::from_str(body)
        .map_err(|e| SyncError::InvalidResponse(format!("invalid JSON: {e}")))?;

    match created.object_id.or(created.id) {
        Some(RemoteId::Text(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        Some(RemoteId::Number(id)) => Ok(id.to_string()),
        Some(RemoteId::Text(_)) | None => Err(SyncError::InvalidResponse(format!("no user id in response: {body}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn user(photo_uri: Option<String>) -> User {
        User {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            mobile_number: "0123456789".into(),
            birth_day: "1815-12-10".into(),
            gender: "Female".into(),
            user_name: "ada".into(),
            password: "secret-pass".into(),
            photo_uri,
            cloud_id: None,
            synced: false,
            sync_attempts: 0,
            sync_error: None,
            sync_failed: false,
        }
    }

    #[test]
    fn test_parse_remote_id_variants() {
        assert_eq!(parse_remote_id(r#"{"_id":"abc123","userName":"ada"}"#).unwrap(), "abc123");
        assert_eq!(parse_remote_id(r#"{"id":42}"#).unwrap(), "42");
        assert!(matches!(parse_remote_id(r#"{"_id":""}"#), Err(SyncError::InvalidResponse(_))));
        assert!(matches!(parse_remote_id(r#"{"ok":true}"#), Err(SyncError::InvalidResponse(_))));
        assert!(matches!(parse_remote_id("<html>"), Err(SyncError::InvalidResponse(_))));
        assert!(matches!(parse_remote_id(r#"{"_id":true}"#), Err(SyncError::InvalidResponse(_))));
        assert_eq!(parse_remote_id(r#"{"_id":null,"id":"x9"}"#).unwrap(), "x9");
    }

    #[tokio::test]
    async fn test_upload_reads_photo() {
        let mut photo = tempfile::NamedTempFile::new().unwrap();
        photo.write_all(b"\xFF\xD8\xFFjpeg").unwrap();

        let upload = UserUpload::from_user(&user(Some(photo.path().display().to_string()))).await;
        assert_eq!(upload.photo.as_deref(), Some(&b"\xFF\xD8\xFFjpeg"[..]));
        assert_eq!(upload.user_name, "ada");
    }

    #[tokio::test]
    async fn test_unreadable_photo_is_skipped() {
        let upload = UserUpload::from_user(&user(Some("/nonexistent/profile.jpg".into()))).await;
        assert!(upload.photo.is_none());
        assert_eq!(upload.email, "ada@example.com");
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = SyncConfig {
            api_url: Url::parse("http://localhost:3000/").unwrap(),
            request_timeout: Duration::from_secs(1),
            probe_interval: Duration::from_secs(1),
            max_attempts: None,
        };
        let remote = HttpRemote::new(&config).unwrap();
        assert_eq!(remote.endpoint().as_str(), "http://localhost:3000/api/users");
    }

    #[test]
    fn test_unjoinable_base_url_is_an_endpoint_error() {
        let config = SyncConfig {
            api_url: Url::parse("mailto:ops@example.com").unwrap(),
            request_timeout: Duration::from_secs(1),
            probe_interval: Duration::from_secs(1),
            max_attempts: None,
        };
        let result = HttpRemote::new(&config);
        assert!(matches!(result, Err(SyncError::InvalidEndpoint { .. })));
        if let Err(e) = result {
            assert!(e.is_permanent());
            assert!(e.to_string().starts_with("Invalid API URL mailto:ops@example.com"));
        }
    }
}
