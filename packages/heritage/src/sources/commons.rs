//! Wikimedia Commons thumbnail resolver.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::traits::images::{ImageResolver, MAX_RESOLVE_BATCH};
use crate::types::config::CommonsConfig;

const FILE_PATH_MARKER: &str = "Special:FilePath/";

/// How a single image reference is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Already displayable.
    Url(String),
    /// Needs a Commons lookup under this `File:` title.
    Title(String),
}

impl ImageReference {
    /// Classify a raw reference. Blank input yields `None`.
    ///
    /// - `.../Special:FilePath/Name.jpg` → `File:Name.jpg`
    /// - other `http(s)` URLs → passed through
    /// - `File:Name.jpg` / `Image:Name.jpg` → `File:Name.jpg`
    /// - `Name.jpg` → `File:Name.jpg`
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(index) = raw.find(FILE_PATH_MARKER) {
            let rest = &raw[index + FILE_PATH_MARKER.len()..];
            let name = rest.split(['?', '#']).next().unwrap_or_default();
            let decoded = urlencoding::decode(name)
                .map(|cow| cow.into_owned())
                .unwrap_or_else(|_| name.to_string());
            return file_title(&decoded).map(ImageReference::Title);
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Some(ImageReference::Url(raw.to_string()));
        }

        file_title(raw).map(ImageReference::Title)
    }
}

fn file_title(name: &str) -> Option<String> {
    let name = name.trim();
    let bare = ["File:", "file:", "Image:", "image:"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
        .trim()
        .replace('_', " ");
    if bare.is_empty() {
        None
    } else {
        Some(format!("File:{}", bare))
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<ApiQuery>,
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    normalized: Vec<Normalization>,
    #[serde(default)]
    pages: HashMap<String, ApiPage>,
}

#[derive(Debug, Deserialize)]
struct Normalization {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    title: String,
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    #[serde(default)]
    thumburl: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl ApiQuery {
    /// Thumbnail (or original) URL per requested title.
    fn urls_by_title(&self) -> HashMap<String, String> {
        let by_page: HashMap<&str, &str> = self
            .pages
            .values()
            .filter(|page| page.missing.is_none())
            .filter_map(|page| {
                let info = page.imageinfo.first()?;
                let url = info.thumburl.as_deref().or(info.url.as_deref())?;
                Some((page.title.as_str(), url))
            })
            .collect();

        let mut urls: HashMap<String, String> = by_page
            .iter()
            .map(|(title, url)| (title.to_string(), url.to_string()))
            .collect();
        for normalization in &self.normalized {
            if let Some(url) = by_page.get(normalization.to.as_str()) {
                urls.insert(normalization.from.clone(), url.to_string());
            }
        }
        urls
    }
}

/// Resolves image references through the Commons `imageinfo` API.
///
/// All titles in a batch go out in one request. References that are already
/// plain URLs are returned unchanged; titles Commons does not know are
/// dropped.
pub struct CommonsImageResolver {
    client: reqwest::Client,
    config: CommonsConfig,
}

impl CommonsImageResolver {
    pub fn new(config: CommonsConfig) -> SourceResult<Self> {
        Url::parse(&config.api_url).map_err(|_| SourceError::InvalidUrl {
            url: config.api_url.clone(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    async fn lookup(&self, titles: &[String]) -> SourceResult<HashMap<String, String>> {
        let width = self.config.thumbnail_width.to_string();
        let joined = titles.join("|");
        let params = [
            ("action", "query"),
            ("prop", "imageinfo"),
            ("iiprop", "url"),
            ("iiurlwidth", width.as_str()),
            ("format", "json"),
            ("titles", joined.as_str()),
        ];

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.config.api_url.clone(),
            });
        }

        let body: ApiResponse = response.json().await?;
        Ok(body
            .query
            .map(|query| query.urls_by_title())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ImageResolver for CommonsImageResolver {
    async fn resolve(&self, references: &[String]) -> SourceResult<Vec<String>> {
        let parsed: Vec<ImageReference> = references
            .iter()
            .take(MAX_RESOLVE_BATCH)
            .filter_map(|raw| ImageReference::parse(raw))
            .collect();

        let mut titles: Vec<String> = Vec::new();
        for reference in &parsed {
            if let ImageReference::Title(title) = reference {
                if !titles.contains(title) {
                    titles.push(title.clone());
                }
            }
        }

        let urls = if titles.is_empty() {
            HashMap::new()
        } else {
            self.lookup(&titles).await.map_err(|e| {
                warn!(titles = titles.len(), error = %e, "Commons lookup failed");
                e
            })?
        };

        let resolved: Vec<String> = parsed
            .into_iter()
            .filter_map(|reference| match reference {
                ImageReference::Url(url) => Some(url),
                ImageReference::Title(title) => urls.get(&title).cloned(),
            })
            .collect();

        debug!(
            requested = references.len().min(MAX_RESOLVE_BATCH),
            titles = titles.len(),
            resolved = resolved.len(),
            "resolved image references"
        );
        Ok(resolved)
    }

    fn name(&self) -> &str {
        "commons"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_references() {
        assert_eq!(
            ImageReference::parse(
                "http://commons.wikimedia.org/wiki/Special:FilePath/Great%20Wall_1.jpg?width=300"
            ),
            Some(ImageReference::Title("File:Great Wall 1.jpg".to_string()))
        );
        assert_eq!(
            ImageReference::parse("File:Petra.jpg"),
            Some(ImageReference::Title("File:Petra.jpg".to_string()))
        );
        assert_eq!(
            ImageReference::parse("Machu_Picchu.jpg"),
            Some(ImageReference::Title("File:Machu Picchu.jpg".to_string()))
        );
        assert_eq!(
            ImageReference::parse("https://upload.wikimedia.org/a.jpg"),
            Some(ImageReference::Url("https://upload.wikimedia.org/a.jpg".to_string()))
        );
        assert_eq!(ImageReference::parse("  "), None);
        assert_eq!(ImageReference::parse("File:"), None);
    }

    fn resolver(server: &MockServer) -> CommonsImageResolver {
        let config = CommonsConfig::default()
            .with_api_url(format!("{}/w/api.php", server.uri()))
            .with_thumbnail_width(320);
        CommonsImageResolver::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_resolves_in_input_order_and_drops_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("action", "query"))
            .and(query_param("iiurlwidth", "320"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {
                    "normalized": [{ "from": "File:petra.jpg", "to": "File:Petra.jpg" }],
                    "pages": {
                        "-1": { "ns": 6, "title": "File:Missing.jpg", "missing": "" },
                        "11": {
                            "title": "File:Petra.jpg",
                            "imageinfo": [{ "thumburl": "https://thumb/petra.jpg", "url": "https://full/petra.jpg" }]
                        },
                        "12": {
                            "title": "File:Wall.jpg",
                            "imageinfo": [{ "url": "https://full/wall.jpg" }]
                        }
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let urls = resolver(&server)
            .resolve(&[
                "File:Wall.jpg".to_string(),
                "https://example.org/direct.jpg".to_string(),
                "File:Missing.jpg".to_string(),
                "File:petra.jpg".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://full/wall.jpg",
                "https://example.org/direct.jpg",
                "https://thumb/petra.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn test_plain_urls_skip_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let urls = resolver(&server)
            .resolve(&["https://example.org/a.jpg".to_string()])
            .await
            .unwrap();
        assert_eq!(urls, vec!["https://example.org/a.jpg"]);
    }

    #[tokio::test]
    async fn test_api_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = resolver(&server).resolve(&["File:A.jpg".to_string()]).await;
        assert!(matches!(result, Err(SourceError::Status { status: 503, .. })));
    }
}
