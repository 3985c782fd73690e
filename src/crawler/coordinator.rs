//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties together:
//! - The scheduler queue
//! - Fetching, including redirect-chain resolution
//! - Page creation and link extraction
//! - The recoverable / fatal error policy

use crate::config::Config;
use crate::crawler::fetcher::{resolve_location, Fetcher, ResponseKind};
use crate::crawler::parser::{parse_document, record_document};
use crate::crawler::scheduler::{CrawlItem, RunState, Scheduler};
use crate::storage::{open_storage, GraphStore, PageRecord, RunStatus, SqliteStorage, UrlRecord};
use crate::url::canonicalize;
use crate::WeaverError;

/// Successful result of fetching one dequeued URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// An HTML page was recorded
    Page {
        page_id: i64,
        /// Canonical URL that owns the page (end of the redirect chain)
        url: String,
        /// Number of redirect hops followed to reach it
        redirects: usize,
        /// Number of new items admitted to the queue
        queued: usize,
    },

    /// The response status is not handled (1xx, 4xx, 5xx, or a redirect without `Location`)
    Ignored { url: String, status: u16 },
}

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items taken off the queue
    pub dequeued: usize,
    /// Pages created or refreshed
    pub pages: usize,
    /// Redirect hops followed
    pub redirects: usize,
    /// Non-HTML 2xx responses
    pub non_html: usize,
    /// Unhandled statuses
    pub ignored: usize,
    /// Redirect overflows, transport and address failures that were skipped
    pub failed: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: GraphStore = SqliteStorage> {
    config: Config,
    storage: S,
    scheduler: Scheduler,
    fetcher: Fetcher,
    config_hash: String,
}

impl Coordinator<SqliteStorage> {
    /// Creates a coordinator with the store named in the configuration
    pub fn new(config: Config) -> Result<Self, WeaverError> {
        let storage = open_storage(&config.output.database_path)?;
        Self::with_storage(config, storage)
    }
}

impl<S: GraphStore> Coordinator<S> {
    /// Creates a coordinator over an already opened store
    pub fn with_storage(config: Config, storage: S) -> Result<Self, WeaverError> {
        let fetcher = Fetcher::new(&config.crawler, &config.user_agent)?;

        Ok(Self {
            config,
            storage,
            scheduler: Scheduler::new(),
            fetcher,
            config_hash: "defaults".to_string(),
        })
    }

    /// Sets the configuration hash recorded with each run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    /// Returns the graph store
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the coordinator and returns the graph store
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Returns the scheduler state
    pub fn state(&self) -> RunState {
        self.scheduler.state()
    }

    /// Crawls from `seed` until the queue is empty
    ///
    /// A run record is created first and marked `completed` or `failed`
    /// according to the result.
    pub async fn run(&mut self, seed: &str) -> Result<RunSummary, WeaverError> {
        let run_id = self.storage.create_run(seed, &self.config_hash)?;
        tracing::info!("Starting crawl run {} from {}", run_id, seed);

        let result = self.drain(seed).await;

        let status = match &result {
            Ok(_) => RunStatus::Completed,
            Err(_) => RunStatus::Failed,
        };
        self.storage.finish_run(run_id, status)?;

        match &result {
            Ok(summary) => tracing::info!(
                "Crawl completed: {} pages, {} redirects, {} skipped",
                summary.pages,
                summary.redirects,
                summary.non_html + summary.ignored + summary.failed
            ),
            Err(e) => tracing::error!("Crawl run {} aborted: {}", run_id, e),
        }

        result
    }

    async fn drain(&mut self, seed: &str) -> Result<RunSummary, WeaverError> {
        self.scheduler.start();

        let seed_url = self.storage.find_or_create_url(&canonicalize(seed))?;
        self.scheduler.enqueue(CrawlItem::seed(seed_url.url));

        let mut summary = RunSummary::default();
        let redirect_limit = self.config.crawler.redirect_limit;

        while let Some(item) = self.scheduler.next_item() {
            summary.dequeued += 1;
            tracing::debug!(
                "Processing {} ({} pending)",
                item.url,
                self.scheduler.pending_len()
            );

            match self.fetch(&item.url, redirect_limit, Vec::new()).await {
                Ok(FetchOutcome::Page { redirects, .. }) => {
                    summary.pages += 1;
                    summary.redirects += redirects;
                }
                Ok(FetchOutcome::Ignored { url, status }) => {
                    tracing::warn!("Ignoring HTTP {} from {}", status, url);
                    summary.ignored += 1;
                }
                Err(WeaverError::UnsupportedContentType { url, content_type }) => {
                    tracing::info!("Unrecognised content type {} at {}", content_type, url);
                    summary.non_html += 1;
                }
                Err(e @ WeaverError::RedirectDepthExceeded { .. }) => {
                    if self.config.crawler.halt_on_redirect_overflow {
                        self.scheduler.halt();
                        return Err(e);
                    }
                    tracing::warn!("Skipping {}: {}", item.url, e);
                    summary.failed += 1;
                }
                Err(e @ (WeaverError::Transport { .. } | WeaverError::Url(_))) => {
                    tracing::warn!("Skipping {}: {}", item.url, e);
                    summary.failed += 1;
                }
                Err(e) => {
                    self.scheduler.halt();
                    return Err(e);
                }
            }
        }

        Ok(summary)
    }

    /// Fetches `url`, following up to `redirect_budget` redirects
    ///
    /// Every redirecting URL gets its status set and is appended to
    /// `redirect_chain`; the chain is attached to the final page as its
    /// redirections. Each URL requested along the way is admitted to the
    /// scheduler, so none of them is fetched again in this run.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome)` - A page was recorded, or the status was ignored
    /// * `Err(WeaverError::RedirectDepthExceeded)` - A redirect arrived with no budget left
    /// * `Err(WeaverError::UnsupportedContentType)` - 2xx that is not HTML
    /// * `Err(WeaverError::Transport)` - The request itself failed
    pub async fn fetch(
        &mut self,
        url: &str,
        redirect_budget: u32,
        mut redirect_chain: Vec<UrlRecord>,
    ) -> Result<FetchOutcome, WeaverError> {
        let mut current = url.to_string();
        let mut budget = redirect_budget;
        let mut hops = 0;

        loop {
            let canonical = canonicalize(&current);
            self.scheduler.mark_admitted(&canonical);

            let response = self.fetcher.get(&current).await?;

            match response.kind() {
                ResponseKind::Html => {
                    let page_url = self.record_status(&canonical, response.status)?;
                    let (page, queued) =
                        self.record_page(&page_url, &response.body, &redirect_chain)?;

                    return Ok(FetchOutcome::Page {
                        page_id: page.id,
                        url: page_url.url,
                        redirects: hops,
                        queued,
                    });
                }
                ResponseKind::NonHtml => {
                    self.record_status(&canonical, response.status)?;
                    return Err(WeaverError::UnsupportedContentType {
                        url: current,
                        content_type: response.content_type.unwrap_or_default(),
                    });
                }
                ResponseKind::Redirect => {
                    if budget == 0 {
                        return Err(WeaverError::RedirectDepthExceeded {
                            url: current,
                            limit: redirect_budget,
                        });
                    }

                    let Some(location) = response.location.as_deref() else {
                        self.record_status(&canonical, response.status)?;
                        return Ok(FetchOutcome::Ignored {
                            url: current,
                            status: response.status,
                        });
                    };

                    let next = resolve_location(location, &current)?;
                    tracing::debug!("Redirecting to: {}", next);

                    let hop = self.record_status(&canonical, response.status)?;
                    redirect_chain.push(hop);

                    budget -= 1;
                    hops += 1;
                    current = next;
                }
                ResponseKind::Unhandled => {
                    self.record_status(&canonical, response.status)?;
                    return Ok(FetchOutcome::Ignored {
                        url: current,
                        status: response.status,
                    });
                }
            }
        }
    }

    /// Finds or creates the URL and stores the status it just answered with
    fn record_status(&mut self, canonical: &str, status: u16) -> Result<UrlRecord, WeaverError> {
        let mut url = self.storage.find_or_create_url(canonical)?;
        self.storage.set_url_status(url.id, status)?;
        url.status = Some(status);
        Ok(url)
    }

    /// Creates or refreshes the page, records its outbound graph and queues
    /// internal destinations
    fn record_page(
        &mut self,
        url: &UrlRecord,
        body: &str,
        redirect_chain: &[UrlRecord],
    ) -> Result<(PageRecord, usize), WeaverError> {
        let page = self.storage.find_or_create_page(url, body, redirect_chain)?;
        tracing::debug!("Page {} for {}", page.id, url.url);
        for redirected in redirect_chain {
            tracing::debug!("Adding redirection: {}", redirected.url);
        }

        let document = parse_document(body);
        let discovered = record_document(&mut self.storage, url, &document)?;

        let queued = discovered
            .into_iter()
            .filter(|item| self.scheduler.enqueue(item.clone()))
            .count();

        Ok((page, queued))
    }
}
