use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use common::api::{ErrorEnvelope, StudentEnvelope};
use common::image::{ALLOWED_EXTENSIONS, is_allowed_extension};
use reqwest::{Method, StatusCode, Url};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Blocking client for `/api/v1`.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("schoolsite-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Absolute URL for a path the server returned, such as a photo URL.
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }

    fn token(&self) -> Result<&str> {
        match self.token.as_deref() {
            Some(token) => Ok(token),
            None => bail!(
                "This command needs an admin token. Run `schoolsite login` and export SCHOOLSITE_TOKEN."
            ),
        }
    }

    fn request(&self, method: Method, path: &str, authed: bool) -> Result<RequestBuilder> {
        let mut req = self.http.request(method, self.api_url(path));
        if authed {
            req = req.bearer_auth(self.token()?);
        }
        Ok(req)
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        authed: bool,
    ) -> Result<T> {
        let res = self.request(Method::GET, path, authed)?.query(query).send();
        decode(res.with_context(|| format!("Request to {path} failed"))?)
    }

    /// Public lookup by roll number. A 404 is `None`.
    pub fn find_result(&self, roll_no: &str) -> Result<Option<StudentEnvelope>> {
        let mut url = Url::parse(&self.api_url("/results")).context("Invalid API URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API URL cannot have a path"))?
            .push(roll_no);

        let res = self
            .http
            .get(url)
            .send()
            .context("Result lookup request failed")?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(res).map(Some)
    }

    pub fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        authed: bool,
    ) -> Result<T> {
        let res = self.request(method, path, authed)?.json(body).send();
        decode(res.with_context(|| format!("Request to {path} failed"))?)
    }

    pub fn send_form<T: DeserializeOwned>(&self, method: Method, path: &str, form: Form) -> Result<T> {
        let res = self.request(method, path, true)?.multipart(form).send();
        decode(res.with_context(|| format!("Request to {path} failed"))?)
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let res = self.request(Method::DELETE, path, true)?.send();
        decode(res.with_context(|| format!("Request to {path} failed"))?)
    }
}

/// Turn a response into `T`, or into an error carrying the server's message.
fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    let text = res.text().context("Failed to read response body")?;

    if !status.is_success() {
        match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(err) => match err.error {
                Some(detail) => bail!("{} ({}: {})", err.message, err.code, detail),
                None => bail!("{} ({})", err.message, err.code),
            },
            Err(_) => bail!("Server returned {status}: {}", text.trim()),
        }
    }

    serde_json::from_str(&text).with_context(|| format!("Unexpected response: {}", text.trim()))
}

/// An image file as a multipart part.
pub fn image_part(path: &Path) -> Result<Part> {
    let mime = image_mime(path).with_context(|| {
        format!(
            "{} is not an image ({})",
            path.display(),
            ALLOWED_EXTENSIONS.join(", ")
        )
    })?;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".into());
    Ok(Part::bytes(bytes).file_name(file_name).mime_str(&mime)?)
}

fn image_mime(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !is_allowed_extension(ext) {
        return None;
    }
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
}
