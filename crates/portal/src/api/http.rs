//! reqwest-backed adapters for the platform ports

use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::{
    config::{OAuthCredentials, PortalAuth, PortalEntry, TokenInfo},
    prompt::Prompter,
};

use super::{
    API_BASE_URL_ENV, ApiError, DEFAULT_API_BASE_URL, DownloadSummary, FetchOptions,
    OAuthExchange, PortalApi,
};

const PAGE_SIZE: usize = 100;

/// `PORTAL_API_BASE_URL`, or the public API when unset
#[must_use]
pub fn base_url_from_env() -> String {
    std::env::var(API_BASE_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url).map_err(|e| ApiError::BaseUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::BaseUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Turn non-2xx responses into [`ApiError::Status`]
async fn check_status(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let mut url = response.url().clone();
    url.set_query(None);
    let body = response.text().await.unwrap_or_default();

    Err(ApiError::Status {
        status,
        url: url.to_string(),
        body,
    })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatResponse {
    #[serde(default)]
    file: Option<RemoteFile>,
    #[serde(default)]
    folder: Option<RemoteFolder>,
}

/// `name` as a single local path component
///
/// Names come from the server; anything that would leave the directory it is joined onto is
/// rejected.
fn local_component(name: &str) -> Result<&str, ApiError> {
    let mut components = Path::new(name).components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(ApiError::UnsafeName(name.to_string())),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RemoteFile {
    name: String,
    #[serde(default)]
    extension: Option<String>,
    url: String,
    #[serde(default)]
    archived: bool,
}

impl RemoteFile {
    fn file_name(&self) -> String {
        match self.extension.as_deref().filter(|e| !e.is_empty()) {
            Some(ext) if !self.name.ends_with(&format!(".{ext}")) => {
                format!("{}.{ext}", self.name)
            }
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RemoteFolder {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    objects: Vec<T>,
    #[serde(default)]
    total: Option<usize>,
}

/// [`PortalApi`] over the platform's REST API
pub struct HttpPortalApi {
    client: Client,
    base_url: String,
    /// Access tokens minted from refresh tokens, by portal id
    ///
    access_tokens: Mutex<HashMap<u64, String>>,
}

impl HttpPortalApi {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            access_tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Client pointed at `PORTAL_API_BASE_URL`, or the public API when unset
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(Client::new(), base_url_from_env())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn authorize(
        &self,
        entry: &PortalEntry,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, ApiError> {
        let missing = entry.missing_credentials();
        if !missing.is_empty() {
            return Err(ApiError::MissingCredentials {
                portal: entry.to_string(),
                missing,
            });
        }

        match entry.auth() {
            PortalAuth::ApiKey { api_key } => Ok(request.query(&[("hapikey", api_key)])),
            PortalAuth::OAuth { auth } => {
                let token = self.access_token(entry.portal_id().unwrap_or_default(), auth).await?;
                Ok(request.bearer_auth(token))
            }
        }
    }

    async fn access_token(
        &self,
        portal_id: u64,
        credentials: &OAuthCredentials,
    ) -> Result<String, ApiError> {
        let mut tokens = self.access_tokens.lock().await;
        if let Some(token) = tokens.get(&portal_id) {
            trace!(portal_id, "using cached access token");
            return Ok(token.clone());
        }

        debug!(portal_id, "refreshing access token");
        let url = endpoint(&self.base_url, &["oauth", "v1", "token"])?;
        let response = self
            .client
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", credentials.token_info.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(ApiError::http)?;
        let token: TokenResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::http)?;

        tokens.insert(portal_id, token.access_token.clone());

        Ok(token.access_token)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        entry: &PortalEntry,
        url: Url,
    ) -> Result<T, ApiError> {
        let request = self.authorize(entry, self.client.get(url)).await?;
        let response = request.send().await.map_err(ApiError::http)?;

        check_status(response).await?.json().await.map_err(ApiError::http)
    }

    async fn list_all<T: for<'de> Deserialize<'de>>(
        &self,
        entry: &PortalEntry,
        segments: &[&str],
        parent_param: &str,
        parent_id: u64,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();

        loop {
            let mut url = endpoint(&self.base_url, segments)?;
            url.query_pairs_mut()
                .append_pair(parent_param, &parent_id.to_string())
                .append_pair("limit", &PAGE_SIZE.to_string())
                .append_pair("offset", &items.len().to_string());

            let page: Page<T> = self.get_json(entry, url).await?;
            let fetched = page.objects.len();
            items.extend(page.objects);

            let done = fetched < PAGE_SIZE || page.total.is_some_and(|total| items.len() >= total);
            if fetched == 0 || done {
                return Ok(items);
            }
        }
    }

    async fn download_file(
        &self,
        file: &RemoteFile,
        dir: &Path,
        options: &FetchOptions,
        summary: &mut DownloadSummary,
    ) -> Result<(), ApiError> {
        if file.archived && !options.include_archived {
            trace!(name = %file.name, "skipping archived file");
            summary.archived_skipped += 1;
            return Ok(());
        }

        let target = dir.join(local_component(&file.file_name())?);
        let response = self
            .client
            .get(&file.url)
            .send()
            .await
            .map_err(ApiError::http)?;
        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(ApiError::http)?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ApiError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|source| ApiError::Io {
                path: target.clone(),
                source,
            })?;
        debug!(path = %target.display(), bytes = bytes.len(), "wrote file");
        summary.files_written += 1;

        Ok(())
    }

    async fn download_folder(
        &self,
        entry: &PortalEntry,
        root: RemoteFolder,
        dest: &Path,
        options: &FetchOptions,
        summary: &mut DownloadSummary,
    ) -> Result<(), ApiError> {
        let root_dir = dest.join(local_component(&root.name)?);
        summary.destination = root_dir.clone();
        let mut pending = vec![(root.id, root_dir)];

        while let Some((folder_id, dir)) = pending.pop() {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| ApiError::Io {
                    path: dir.clone(),
                    source,
                })?;

            let files: Vec<RemoteFile> = self
                .list_all(entry, &["filemanager", "api", "v2", "files"], "folder_id", folder_id)
                .await?;
            for file in &files {
                self.download_file(file, &dir, options, summary).await?;
            }

            let folders: Vec<RemoteFolder> = self
                .list_all(
                    entry,
                    &["filemanager", "api", "v2", "folders"],
                    "parent_folder_id",
                    folder_id,
                )
                .await?;
            for folder in folders {
                let child = dir.join(local_component(&folder.name)?);
                pending.push((folder.id, child));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn check_reachable(&self, entry: &PortalEntry) -> Result<(), ApiError> {
        let url = endpoint(&self.base_url, &["integrations", "v1", "me"])?;
        let _: serde_json::Value = self.get_json(entry, url).await?;

        Ok(())
    }

    async fn download_resource(
        &self,
        entry: &PortalEntry,
        src: &str,
        dest: &Path,
        options: &FetchOptions,
    ) -> Result<DownloadSummary, ApiError> {
        let mut segments = vec!["filemanager", "api", "v3", "files", "stat"];
        segments.extend(src.split('/').filter(|s| !s.is_empty()));
        let url = endpoint(&self.base_url, &segments)?;

        let stat: StatResponse = match self.get_json(entry, url).await {
            Err(ApiError::Status { status: 404, .. }) => {
                return Err(ApiError::NotFound(src.to_string()));
            }
            other => other?,
        };

        let mut summary = DownloadSummary::default();
        match (stat.file, stat.folder) {
            (Some(file), _) => {
                summary.destination = dest.join(local_component(&file.file_name())?);
                self.download_file(&file, dest, options, &mut summary).await?;
            }
            (None, Some(folder)) => {
                self.download_folder(entry, folder, dest, options, &mut summary)
                    .await?;
            }
            (None, None) => return Err(ApiError::NotFound(src.to_string())),
        }

        Ok(summary)
    }

    async fn delete_table(&self, entry: &PortalEntry, table_id: &str) -> Result<(), ApiError> {
        let url = endpoint(&self.base_url, &["hubdb", "api", "v2", "tables", table_id])?;
        let request = self.authorize(entry, self.client.delete(url)).await?;
        let response = request.send().await.map_err(ApiError::http)?;
        check_status(response).await?;

        Ok(())
    }
}

/// Where the user is sent to approve the app
pub const DEFAULT_AUTHORIZE_BASE_URL: &str = "https://app.hubspot.com";

/// Redirect registered for the CLI's OAuth app; the user copies the code from it
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/oauth-callback";

/// [`OAuthExchange`] that asks for app credentials, sends the user to the authorize page and
/// trades the pasted code for a refresh token
pub struct HttpOAuthExchange<P> {
    prompter: Arc<P>,
    client: Client,
    base_url: String,
    authorize_base_url: String,
    redirect_uri: String,
}

impl<P: Prompter + 'static> HttpOAuthExchange<P> {
    #[must_use]
    pub fn new(prompter: Arc<P>, client: Client, base_url: impl Into<String>) -> Self {
        Self {
            prompter,
            client,
            base_url: base_url.into(),
            authorize_base_url: DEFAULT_AUTHORIZE_BASE_URL.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }

    #[must_use]
    pub fn from_env(prompter: Arc<P>) -> Self {
        Self::new(prompter, Client::new(), base_url_from_env())
    }

    #[must_use]
    pub fn with_authorize_base_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_base_url = url.into();
        self
    }

    fn authorize_url(&self, portal_id: u64, client_id: &str, scopes: &[String]) -> Result<Url, ApiError> {
        let portal_id = portal_id.to_string();
        let base = endpoint(
            &self.authorize_base_url,
            &["oauth", portal_id.as_str(), "authorize"],
        )?;
        let scope = scopes.join(" ");

        Url::parse_with_params(
            base.as_str(),
            &[
                ("client_id", client_id),
                ("scope", scope.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| ApiError::BaseUrl(e.to_string()))
    }
}

#[async_trait]
impl<P: Prompter + 'static> OAuthExchange for HttpOAuthExchange<P> {
    async fn exchange(&self) -> Result<PortalEntry, ApiError> {
        // Prompts block on the terminal; keep them off the runtime so Ctrl-C is still observed
        let prompter = Arc::clone(&self.prompter);
        let answers = tokio::task::spawn_blocking(move || prompter.oauth_answers()).await??;

        let authorize_url =
            self.authorize_url(answers.portal_id, &answers.client_id, &answers.scopes)?;
        let prompter = Arc::clone(&self.prompter);
        let code = tokio::task::spawn_blocking(move || {
            prompter.authorization_code(authorize_url.as_str())
        })
        .await??;

        let url = endpoint(&self.base_url, &["oauth", "v1", "token"])?;
        let response = self
            .client
            .post(url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", answers.client_id.as_str()),
                ("client_secret", answers.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code", code.trim()),
            ])
            .send()
            .await
            .map_err(ApiError::http)?;
        let tokens: TokenResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::http)?;

        let refresh_token = tokens
            .refresh_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ApiError::MissingRefreshToken)?;
        debug!(portal_id = answers.portal_id, "authorization code exchanged");

        Ok(PortalEntry::oauth(
            &answers.name,
            answers.portal_id,
            OAuthCredentials {
                client_id: answers.client_id,
                client_secret: answers.client_secret,
                scopes: answers.scopes,
                token_info: TokenInfo {
                    refresh_token,
                },
            },
        ))
    }
}

/// Resolve a user-supplied destination against `cwd`, expanding `~`
#[must_use]
pub fn resolve_local_path(dest: Option<&str>, cwd: &Path) -> PathBuf {
    match dest.map(str::trim).filter(|d| !d.is_empty()) {
        None => cwd.to_path_buf(),
        Some(dest) => {
            let expanded = PathBuf::from(shellexpand::tilde(dest).as_ref());
            if expanded.is_absolute() {
                expanded
            } else {
                cwd.join(expanded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AuthMethod,
        prompt::{MockPrompter, OAuthAnswers, PromptError},
    };
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        Client::builder()
            .no_proxy()
            .build()
            .expect("Failed to create HTTP client")
    }

    fn api(server: &MockServer) -> HttpPortalApi {
        HttpPortalApi::new(client(), server.uri())
    }

    fn oauth_entry() -> PortalEntry {
        PortalEntry::oauth(
            "oauthy",
            77,
            OAuthCredentials {
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                scopes: vec!["content".to_string()],
                token_info: TokenInfo {
                    refresh_token: "refresh".to_string(),
                },
            },
        )
    }

    #[tokio::test]
    async fn test_check_reachable_with_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/integrations/v1/me"))
            .and(query_param("hapikey", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"portalId": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let result = api(&server)
            .check_reachable(&PortalEntry::api_key("prod", 1, "k"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_key_does_not_leak_into_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/integrations/v1/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = api(&server)
            .check_reachable(&PortalEntry::api_key("prod", 1, "super-secret"))
            .await
            .unwrap_err();

        assert!(err.is_rejection());
        assert!(!err.to_string().contains("super-secret"));
        assert!(err.to_string().contains("/integrations/v1/me"));
    }

    #[tokio::test]
    async fn test_missing_credentials_short_circuit() {
        let server = MockServer::start().await;

        let err = api(&server)
            .check_reachable(&PortalEntry::api_key("prod", 1, ""))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::MissingCredentials { ref missing, .. } if missing == &vec!["apiKey"]));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_oauth_token_is_refreshed_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "access"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/hubdb/api/v2/tables/42"))
            .and(header("authorization", "Bearer access"))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&server)
            .await;

        let api = api(&server);
        api.delete_table(&oauth_entry(), "42").await.unwrap();
        api.delete_table(&oauth_entry(), "42").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_table_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/hubdb/api/v2/tables/42"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such table"))
            .mount(&server)
            .await;

        let err = api(&server)
            .delete_table(&PortalEntry::api_key("prod", 1, "k"), "42")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 404, ref body, .. } if body == "no such table"));
    }

    #[tokio::test]
    async fn test_download_single_file() {
        let server = MockServer::start().await;
        let dest = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v3/files/stat/images/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {
                    "name": "logo",
                    "extension": "png",
                    "url": format!("{}/cdn/logo.png", server.uri()),
                    "archived": false
                },
                "folder": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cdn/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
            .mount(&server)
            .await;

        let summary = api(&server)
            .download_resource(
                &PortalEntry::api_key("prod", 1, "k"),
                "images/logo.png",
                dest.path(),
                &FetchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.destination, dest.path().join("logo.png"));
        assert_eq!(
            std::fs::read(dest.path().join("logo.png")).unwrap(),
            b"png-bytes"
        );
    }

    #[tokio::test]
    async fn test_download_rejects_name_escaping_destination() {
        let server = MockServer::start().await;
        let root = TempDir::new().unwrap();
        let dest = root.path().join("dest");
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v3/files/stat/notes.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {
                    "name": "../escaped",
                    "extension": "txt",
                    "url": format!("{}/cdn/escaped.txt", server.uri()),
                    "archived": false
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cdn/escaped.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"oops".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let result = api(&server)
            .download_resource(
                &PortalEntry::api_key("prod", 1, "k"),
                "notes.txt",
                &dest,
                &FetchOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(ApiError::UnsafeName(name)) if name == "../escaped.txt"));
        assert!(!root.path().join("escaped.txt").exists());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_rejects_absolute_folder_name() {
        let server = MockServer::start().await;
        let dest = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v3/files/stat/docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "folder": { "id": 7, "name": "/tmp/elsewhere" }
            })))
            .mount(&server)
            .await;

        let result = api(&server)
            .download_resource(
                &PortalEntry::api_key("prod", 1, "k"),
                "docs",
                dest.path(),
                &FetchOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(ApiError::UnsafeName(_))));
    }

    #[tokio::test]
    async fn test_download_folder_skips_archived_files() {
        let server = MockServer::start().await;
        let dest = TempDir::new().unwrap();
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v3/files/stat/docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": null,
                "folder": {"id": 10, "name": "docs"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v2/files"))
            .and(query_param("folder_id", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objects": [
                    {"name": "a.txt", "url": format!("{}/cdn/a.txt", server.uri())},
                    {"name": "old.txt", "url": format!("{}/cdn/old.txt", server.uri()), "archived": true}
                ],
                "total": 2
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v2/folders"))
            .and(query_param("parent_folder_id", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objects": [{"id": 11, "name": "nested"}],
                "total": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v2/files"))
            .and(query_param("folder_id", "11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objects": [{"name": "b", "extension": "txt", "url": format!("{}/cdn/b.txt", server.uri())}],
                "total": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v2/folders"))
            .and(query_param("parent_folder_id", "11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"objects": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cdn/a.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cdn/b.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("b"))
            .mount(&server)
            .await;

        let summary = api(&server)
            .download_resource(
                &PortalEntry::api_key("prod", 1, "k"),
                "/docs",
                dest.path(),
                &FetchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(summary.files_written, 2);
        assert_eq!(summary.archived_skipped, 1);
        assert_eq!(summary.destination, dest.path().join("docs"));
        assert!(dest.path().join("docs/a.txt").exists());
        assert!(dest.path().join("docs/nested/b.txt").exists());
        assert!(!dest.path().join("docs/old.txt").exists());
    }

    #[tokio::test]
    async fn test_download_missing_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/filemanager/api/v3/files/stat/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = api(&server)
            .download_resource(
                &PortalEntry::api_key("prod", 1, "k"),
                "nope",
                Path::new("/unused"),
                &FetchOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotFound(ref src) if src == "nope"));
    }

    #[tokio::test]
    async fn test_oauth_exchange_builds_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access",
                "refresh_token": "fresh-refresh"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut prompter = MockPrompter::new();
        prompter.expect_oauth_answers().times(1).returning(|| {
            Ok(OAuthAnswers {
                name: "Acme".to_string(),
                portal_id: 123,
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                scopes: vec!["content".to_string()],
            })
        });
        prompter
            .expect_authorization_code()
            .withf(|url| url.starts_with("https://app.example.test/oauth/123/authorize?client_id=client"))
            .times(1)
            .returning(|_| Ok("the-code\n".to_string()));

        let exchange = HttpOAuthExchange::new(Arc::new(prompter), client(), server.uri())
            .with_authorize_base_url("https://app.example.test");
        let entry = exchange.exchange().await.unwrap();

        assert_eq!(entry.auth_method(), AuthMethod::OAuth);
        assert_eq!(entry.portal_id(), Some(123));
        assert!(entry.missing_credentials().is_empty());
    }

    #[tokio::test]
    async fn test_oauth_exchange_without_refresh_token_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "a"
            })))
            .mount(&server)
            .await;

        let mut prompter = MockPrompter::new();
        prompter.expect_oauth_answers().returning(|| {
            Ok(OAuthAnswers {
                name: "Acme".to_string(),
                portal_id: 123,
                client_id: "client".to_string(),
                client_secret: "secret".to_string(),
                scopes: vec!["content".to_string()],
            })
        });
        prompter
            .expect_authorization_code()
            .returning(|_| Ok("the-code".to_string()));

        let exchange = HttpOAuthExchange::new(Arc::new(prompter), client(), server.uri());

        assert!(matches!(
            exchange.exchange().await,
            Err(ApiError::MissingRefreshToken)
        ));
    }

    #[tokio::test]
    async fn test_oauth_exchange_cancelled_prompt() {
        let server = MockServer::start().await;
        let mut prompter = MockPrompter::new();
        prompter
            .expect_oauth_answers()
            .returning(|| Err(PromptError::Cancelled));

        let exchange = HttpOAuthExchange::new(Arc::new(prompter), client(), server.uri());

        assert!(matches!(
            exchange.exchange().await,
            Err(ApiError::Prompt(PromptError::Cancelled))
        ));
    }

    #[test]
    fn test_resolve_local_path() {
        let cwd = Path::new("/work");

        assert_eq!(resolve_local_path(None, cwd), PathBuf::from("/work"));
        assert_eq!(resolve_local_path(Some("  "), cwd), PathBuf::from("/work"));
        assert_eq!(
            resolve_local_path(Some("out/site"), cwd),
            PathBuf::from("/work/out/site")
        );
        assert_eq!(resolve_local_path(Some("/abs"), cwd), PathBuf::from("/abs"));
    }

    #[test]
    fn test_local_component() {
        assert_eq!(local_component("logo.png").unwrap(), "logo.png");
        assert_eq!(local_component("my docs").unwrap(), "my docs");

        for name in ["../x", "..", ".", "", "/etc/passwd", "a/b"] {
            assert!(
                matches!(local_component(name), Err(ApiError::UnsafeName(_))),
                "{name:?} was accepted"
            );
        }
    }

    #[test]
    fn test_file_name_appends_extension_once() {
        let file = |name: &str, ext: Option<&str>| RemoteFile {
            name: name.to_string(),
            extension: ext.map(ToString::to_string),
            url: String::new(),
            archived: false,
        };

        assert_eq!(file("logo", Some("png")).file_name(), "logo.png");
        assert_eq!(file("logo.png", Some("png")).file_name(), "logo.png");
        assert_eq!(file("README", None).file_name(), "README");
    }
}
