use crate::fetcher::PageFetcher;
use crate::parsers::ContentExtractor;
use crate::results::{CrawlResult, DiscoveredLink, PageContent};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use url::Url;

/// How fetch+extract units are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// One page at a time, in discovery order
    Sequential,
    /// A bounded pool of this many workers
    Pool(usize),
}

type Job = (usize, String);

/// Drives fetch and extraction over a discovered link list
pub struct CrawlOrchestrator {
    fetcher: PageFetcher,
    extractor: Arc<ContentExtractor>,
    schedule: Schedule,
}

impl CrawlOrchestrator {
    pub fn new(fetcher: PageFetcher, extractor: ContentExtractor, schedule: Schedule) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(extractor),
            schedule,
        }
    }

    /// Fetches and extracts every link. The result holds one entry per link at
    /// the link's own index; failed pages are `None`, never dropped.
    pub async fn run(&self, links: &[DiscoveredLink]) -> CrawlResult {
        let mut slots: Vec<Option<String>> = vec![None; links.len()];

        match self.schedule {
            Schedule::Sequential => {
                for (slot, link) in slots.iter_mut().zip(links) {
                    *slot = process_link(&self.fetcher, &self.extractor, &link.canonical_url).await;
                }
            }
            Schedule::Pool(workers) => self.run_pool(links, workers, &mut slots).await,
        }

        let contents = links
            .iter()
            .cloned()
            .zip(slots)
            .map(|(link, text)| PageContent::new(link, text))
            .collect::<Vec<_>>();

        let result = CrawlResult::new(contents);
        ::log::info!(
            "Crawled {} pages, {} without content",
            result.contents.len(),
            result.failed()
        );
        result
    }

    async fn run_pool(&self, links: &[DiscoveredLink], workers: usize, slots: &mut [Option<String>]) {
        if links.is_empty() {
            return;
        }
        let num_workers = workers.clamp(1, links.len());

        // Every job is queued up front; the queue never blocks
        let (job_tx, job_rx) = mpsc::channel::<Job>(links.len());
        for (index, link) in links.iter().enumerate() {
            if job_tx.send((index, link.canonical_url.clone())).await.is_err() {
                break;
            }
        }
        drop(job_tx);

        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<(usize, Option<String>)>(links.len());

        let handles = (0..num_workers)
            .map(|worker_id| {
                spawn_worker(
                    worker_id,
                    self.fetcher.clone(),
                    Arc::clone(&self.extractor),
                    Arc::clone(&job_rx),
                    result_tx.clone(),
                )
            })
            .collect::<Vec<_>>();

        // Drop the original sender so the loop below ends with the last worker
        drop(result_tx);

        while let Some((index, text)) = result_rx.recv().await {
            slots[index] = text;
        }

        for (worker_id, outcome) in join_all(handles).await.into_iter().enumerate() {
            if let Err(e) = outcome {
                ::log::error!("Worker {} terminated abnormally: {}", worker_id, e);
            }
        }
    }
}

/// Spawns a worker that takes jobs until the queue is drained
fn spawn_worker(
    worker_id: usize,
    fetcher: PageFetcher,
    extractor: Arc<ContentExtractor>,
    job_rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    result_tx: mpsc::Sender<(usize, Option<String>)>,
) -> JoinHandle<()> {
    ::log::trace!("Spawning worker {}", worker_id);

    tokio::spawn(async move {
        loop {
            let job = {
                let mut rx = job_rx.lock().await;
                rx.recv().await
            };
            let Some((index, url)) = job else {
                break;
            };

            ::log::trace!("Worker {} processing: {}", worker_id, url);
            let text = process_link(&fetcher, &extractor, &url).await;

            if let Err(e) = result_tx.send((index, text)).await {
                ::log::error!("Worker {} failed to send result: {}", worker_id, e);
                break;
            }
        }
        ::log::debug!("Worker {} completed - no more URLs to process", worker_id);
    })
}

/// Fetch then extract one page; any failure degrades to `None`
async fn process_link(fetcher: &PageFetcher, extractor: &ContentExtractor, url: &str) -> Option<String> {
    let url = match Url::parse(url) {
        Ok(url) => url,
        Err(e) => {
            ::log::error!("Skipping invalid URL {}: {}", url, e);
            return None;
        }
    };

    let html = match fetcher.fetch(&url).await {
        Ok(html) => html,
        Err(e) => {
            ::log::error!("{}", e);
            return None;
        }
    };

    let text = extractor.extract(&html);
    if text.is_none() {
        ::log::debug!("No content extracted from {}", url);
    }
    text
}
