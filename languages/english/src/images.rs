use async_trait::async_trait;
use serde_json::Value;
use wordlens_provider::{ImageProvider, ProviderError, ProviderMetadata, RetryingHttpClient};

/// Thumbnail width requested from the encyclopedia
const THUMBNAIL_SIZE: &str = "500";

/// Smaller thumbnails are icons, not illustrations
const MIN_DIMENSION: u64 = 100;

/// Logos, flags and placeholders that pages use as their lead image
const SERVICE_IMAGE_MARKERS: &[&str] = &[
    "commons-logo",
    "disambig",
    "ambox",
    "wiki_letter",
    "question_book",
    "folder",
    "decrease",
    "increase",
    "edit-clear",
    "symbol",
    "icon",
    "no_image",
    "image_missing",
    "placeholder",
    "replace_this",
    "wiktionary",
    "wikiquote",
    "wikibooks",
    "wikisource",
    "flag_of",
    "coat_of_arms",
    "emblem",
    "crystal",
    "nuvola",
    "tango",
    ".svg",
];

fn search_term(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase()
}

async fn download(client: &RetryingHttpClient, url: &str) -> Result<Option<Vec<u8>>, ProviderError> {
    let response = client.get_url(url).await?;

    if !response.is_success() {
        return Err(ProviderError::from_status(response.status));
    }
    if response.body.is_empty() {
        return Ok(None);
    }

    Ok(Some(response.body))
}

/// Stock photo search; needs an API key sent as the `Authorization` header
#[derive(Clone)]
pub struct PexelsImages {
    client: RetryingHttpClient,
    has_key: bool,
}

impl PexelsImages {
    pub fn new(client: RetryingHttpClient, api_key: &str) -> Self {
        Self {
            client: client.with_header("Authorization", api_key),
            has_key: !api_key.is_empty(),
        }
    }
}

#[async_trait]
impl ImageProvider for PexelsImages {
    async fn find_image(&self, word: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        let term = search_term(word);
        if !self.has_key || term.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get("", &[("query", term.as_str()), ("per_page", "1")])
            .await?;
        if !response.is_success() {
            return Err(ProviderError::from_status(response.status));
        }

        let data: Value = response.json()?;
        match first_photo_url(&data) {
            Some(url) => download(&self.client, &url).await,
            None => Ok(None),
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Pexels".to_string(),
            requires_api_key: true,
            free_tier_available: true,
        }
    }
}

fn first_photo_url(data: &Value) -> Option<String> {
    data.get("photos")?
        .get(0)?
        .get("src")?
        .get("medium")?
        .as_str()
        .map(str::to_string)
}

/// Lead image of the encyclopedia page titled after the word
#[derive(Clone)]
pub struct WikipediaImages {
    client: RetryingHttpClient,
}

impl WikipediaImages {
    pub fn new(client: RetryingHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageProvider for WikipediaImages {
    async fn find_image(&self, word: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        let term = search_term(word);
        if term.is_empty() {
            return Ok(None);
        }

        let params = [
            ("action", "query"),
            ("titles", term.as_str()),
            ("prop", "pageimages"),
            ("format", "json"),
            ("pithumbsize", THUMBNAIL_SIZE),
        ];
        let response = self.client.get("", &params).await?;
        if !response.is_success() {
            return Err(ProviderError::from_status(response.status));
        }

        let data: Value = response.json()?;
        match usable_thumbnail(&data) {
            Some(url) => download(&self.client, &url).await,
            None => Ok(None),
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Wikipedia".to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}

/// First page thumbnail that is large enough and not a service image
fn usable_thumbnail(data: &Value) -> Option<String> {
    let pages = data.get("query")?.get("pages")?.as_object()?;

    pages
        .iter()
        .filter(|(id, _)| id.as_str() != "-1")
        .filter_map(|(_, page)| page.get("thumbnail"))
        .find_map(|thumbnail| {
            let url = thumbnail.get("source")?.as_str()?;
            let width = thumbnail.get("width").and_then(Value::as_u64).unwrap_or(0);
            let height = thumbnail.get("height").and_then(Value::as_u64).unwrap_or(0);

            let lower = url.to_lowercase();
            let is_service = SERVICE_IMAGE_MARKERS.iter().any(|m| lower.contains(m));

            (!url.is_empty() && !is_service && width >= MIN_DIMENSION && height >= MIN_DIMENSION)
                .then(|| url.to_string())
        })
}
