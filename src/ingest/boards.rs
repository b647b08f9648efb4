//! HTML job board scrapers.
//!
//! A board is described declaratively by a [`BoardSpec`]: how to build the
//! search request for a page, which element is a listing card and where each
//! field lives inside it. Boards do not expose a description, so the title
//! doubles as the description, and the skill level defaults to "Mid".

use crate::config::IngestConfig;
use crate::document::record::RawJobRecord;
use crate::ingest::JobSource;
use anyhow::{Context, Result, anyhow};
use futures::future::BoxFuture;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

const DEFAULT_SKILL_LEVEL: &str = "Mid";

/// Where a card's link comes from.
#[derive(Debug, Clone, Copy)]
pub enum LinkLocation {
    /// The card element itself carries the `href`.
    Card,
    /// A descendant matching this selector carries the `href`.
    Within(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct BoardSpec {
    pub name: &'static str,
    /// Search request for a query and a zero-based page number.
    pub search: fn(&Client, &str, u32) -> RequestBuilder,
    pub card: &'static str,
    pub title: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub date: Option<&'static str>,
    pub link: LinkLocation,
    /// Prepended to the raw `href`; empty keeps it as scraped.
    pub link_prefix: &'static str,
}

/// Monster takes the query as a hyphenated slug.
fn monster_search(client: &Client, query: &str, page: u32) -> RequestBuilder {
    let slug = query.split_whitespace().collect::<Vec<_>>().join("-");
    let page = (page + 1).to_string();
    client
        .get("https://www.monster.com/jobs/search/")
        .query(&[("q", slug.as_str()), ("page", page.as_str())])
}

fn apna_search(client: &Client, query: &str, page: u32) -> RequestBuilder {
    let page = (page + 1).to_string();
    client
        .get("https://apna.co/jobs")
        .query(&[("q", query), ("page", page.as_str())])
}

fn cuvette_search(client: &Client, query: &str, page: u32) -> RequestBuilder {
    let page = (page + 1).to_string();
    client
        .get("https://cuvette.io/jobs")
        .query(&[("q", query), ("page", page.as_str())])
}

fn indeed_search(client: &Client, query: &str, page: u32) -> RequestBuilder {
    let start = (page * 10).to_string();
    client
        .get("https://www.indeed.com/jobs")
        .query(&[("q", query), ("start", start.as_str())])
}

pub const MONSTER: BoardSpec = BoardSpec {
    name: "Monster",
    search: monster_search,
    card: "section.card-content",
    title: "h2.title",
    company: "div.company",
    location: "div.location",
    date: Some("time"),
    link: LinkLocation::Within("h2.title a[href]"),
    link_prefix: "",
};

pub const APNA: BoardSpec = BoardSpec {
    name: "Apna",
    search: apna_search,
    card: "a.job-card",
    title: "h3.job-title",
    company: "p.company-name",
    location: "span.location",
    date: None,
    link: LinkLocation::Card,
    link_prefix: "https://apna.co",
};

pub const CUVETTE: BoardSpec = BoardSpec {
    name: "Cuvette",
    search: cuvette_search,
    card: "a.job-listing-link",
    title: "h2",
    company: "div.company-name",
    location: "div.job-location",
    date: None,
    link: LinkLocation::Card,
    link_prefix: "https://cuvette.io",
};

pub const INDEED: BoardSpec = BoardSpec {
    name: "Indeed",
    search: indeed_search,
    card: "div.job_seen_beacon",
    title: "h2.jobTitle",
    company: "span.companyName",
    location: "div.companyLocation",
    date: Some("span.date"),
    link: LinkLocation::Within("h2.jobTitle a[href]"),
    link_prefix: "https://www.indeed.com",
};

pub const ALL_BOARDS: [BoardSpec; 4] = [MONSTER, APNA, CUVETTE, INDEED];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector '{}': {:?}", css, e))
}

fn first_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Extracts every listing card from one result page.
pub fn parse_listings(spec: &BoardSpec, html: &str) -> Result<Vec<RawJobRecord>> {
    let card_sel = selector(spec.card)?;
    let title_sel = selector(spec.title)?;
    let company_sel = selector(spec.company)?;
    let location_sel = selector(spec.location)?;
    let date_sel = spec.date.map(selector).transpose()?;
    let link_sel = match spec.link {
        LinkLocation::Within(css) => Some(selector(css)?),
        LinkLocation::Card => None,
    };

    let document = Html::parse_document(html);
    let mut listings = Vec::new();

    for card in document.select(&card_sel) {
        let title = first_text(&card, &title_sel);
        let href = match &link_sel {
            Some(sel) => card
                .select(sel)
                .next()
                .and_then(|el| el.value().attr("href")),
            None => card.value().attr("href"),
        };

        listings.push(RawJobRecord {
            description: title.clone(),
            title,
            company: first_text(&card, &company_sel),
            location: first_text(&card, &location_sel),
            date_posted: date_sel.as_ref().and_then(|sel| first_text(&card, sel)),
            skill_level: Some(DEFAULT_SKILL_LEVEL.to_string()),
            link: href.map(|h| format!("{}{}", spec.link_prefix, h)),
            source: Some(spec.name.to_string()),
            skills: None,
        });
    }

    Ok(listings)
}

/// A [`BoardSpec`] bound to an HTTP client.
pub struct BoardSource {
    spec: BoardSpec,
    client: Client,
    pages: u32,
}

impl BoardSource {
    pub fn new(spec: BoardSpec, client: Client, pages: u32) -> Self {
        Self { spec, client, pages }
    }

    async fn fetch_pages(&self, query: &str) -> Result<Vec<RawJobRecord>> {
        let mut listings = Vec::new();
        for page in 0..self.pages {
            let request = (self.spec.search)(&self.client, query, page)
                .build()
                .with_context(|| format!("cannot build {} request", self.spec.name))?;
            let url = request.url().to_string();
            debug!("Requesting {}", url);

            let body = self
                .client
                .execute(request)
                .await
                .and_then(|response| response.error_for_status())
                .with_context(|| format!("request to {url} failed"))?
                .text()
                .await
                .with_context(|| format!("reading body of {url} failed"))?;

            listings.extend(parse_listings(&self.spec, &body)?);
        }
        Ok(listings)
    }
}

impl JobSource for BoardSource {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn fetch<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<RawJobRecord>>> {
        Box::pin(self.fetch_pages(query))
    }
}

/// Builds the configured boards sharing one client. Unknown board names are skipped.
pub fn boards_from_settings(config: &IngestConfig) -> Result<Vec<Box<dyn JobSource>>> {
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let mut sources: Vec<Box<dyn JobSource>> = Vec::new();
    for name in &config.sources {
        match ALL_BOARDS
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
        {
            Some(spec) => sources.push(Box::new(BoardSource::new(
                *spec,
                client.clone(),
                config.pages,
            ))),
            None => warn!("Unknown job board '{}' in configuration, ignoring", name),
        }
    }
    Ok(sources)
}
