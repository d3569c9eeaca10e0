//! Breed information scraped from public breed directories.
//!
//! Each source is tried in order. A failing source never stops the next one;
//! the first failure is kept in [`BreedInfo::error`] and the result counts as
//! successful when any source answered with a page.

pub mod akc;
pub mod dogtime;

use crate::config::RetrieverConfig;
use crate::error::{AppError, Result};
use crate::models::breed_info_types::{BreedInfo, SourceContent};
use crate::services::breed_name::normalize_for_query;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait BreedInfoRetriever: Send + Sync {
    async fn scrape_breed_info(&self, breed: &str) -> Result<BreedInfo>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Akc,
    DogTime,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Akc, Source::DogTime];

    pub fn name(&self) -> &'static str {
        match self {
            Source::Akc => "akc",
            Source::DogTime => "dogtime",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Source::Akc => akc::BASE_URL,
            Source::DogTime => dogtime::BASE_URL,
        }
    }

    pub fn url_for(&self, breed: &str) -> String {
        page_url(self.base_url(), breed)
    }

    pub fn extract(&self, html: &str) -> Result<SourceContent> {
        let document = Html::parse_document(html);
        match self {
            Source::Akc => akc::extract(&document),
            Source::DogTime => dogtime::extract(&document),
        }
    }
}

/// What happened when one source was queried.
#[derive(Debug)]
pub enum SourceOutcome {
    Content(SourceContent),
    /// The page answered with a non-success status.
    Skipped(u16),
    Failed(String),
}

impl BreedInfo {
    pub fn new(breed: &str) -> Self {
        Self {
            breed: breed.to_string(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, source: Source, outcome: SourceOutcome) {
        match outcome {
            SourceOutcome::Content(content) => {
                self.content.insert(source.name().to_string(), content);
                self.success = true;
            }
            SourceOutcome::Skipped(status) => {
                debug!(source = source.name(), status, "source returned no page");
            }
            SourceOutcome::Failed(message) => {
                warn!(source = source.name(), error = %message, "source failed");
                if self.error.is_none() {
                    self.error = Some(format!("Error scraping {}: {}", source.name(), message));
                }
            }
        }
    }
}

fn page_url(base_url: &str, breed: &str) -> String {
    format!("{}{}", base_url, normalize_for_query(breed))
}

pub fn validate_breed_name(breed: &str) -> Result<&str> {
    let breed = breed.trim();
    if breed.chars().count() < 2 {
        return Err(AppError::Retrieval("Please provide a valid dog breed name".into()));
    }
    Ok(breed)
}

/// HTTP scraper over [`Source::ALL`].
pub struct WebRetriever {
    client: reqwest::Client,
    /// Queried in order, each with the base URL its pages live under.
    sources: Vec<(Source, String)>,
    request_delay: Duration,
}

impl WebRetriever {
    pub fn new(config: &RetrieverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            sources: Source::ALL
                .iter()
                .map(|source| (*source, source.base_url().to_string()))
                .collect(),
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, source: Source, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        for (s, url) in &mut self.sources {
            if *s == source {
                *url = base_url.clone();
            }
        }
        self
    }

    async fn query(&self, source: Source, base_url: &str, breed: &str) -> SourceOutcome {
        let url = page_url(base_url, breed);
        debug!(%url, "fetching breed page");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return SourceOutcome::Failed(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return SourceOutcome::Skipped(status.as_u16());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return SourceOutcome::Failed(e.to_string()),
        };

        match source.extract(&body) {
            Ok(content) => SourceOutcome::Content(content),
            Err(e) => SourceOutcome::Failed(e.to_string()),
        }
    }
}

#[async_trait]
impl BreedInfoRetriever for WebRetriever {
    async fn scrape_breed_info(&self, breed: &str) -> Result<BreedInfo> {
        let breed = validate_breed_name(breed)?;
        let mut info = BreedInfo::new(breed);

        for (i, (source, base_url)) in self.sources.iter().enumerate() {
            let outcome = self.query(*source, base_url, breed).await;
            info.record(*source, outcome);

            if i + 1 < self.sources.len() && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        Ok(info)
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AppError::Retrieval(format!("invalid selector '{}': {}", css, e)))
}

pub(crate) fn select_first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Element text with whitespace runs collapsed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `<p>` that follows `anchor` in document order, including its descendants.
pub(crate) fn first_paragraph_after(document: &Html, anchor: ElementRef<'_>) -> Option<String> {
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "p")
        .map(text_of)
}
