use pokedex_catalog::types::Pokemon;
use pokedex_catalog::{ClientError, ClientTrait};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::detail_viewer::{DetailRequest, DetailViewer};
use super::id_index::IdNameIndex;
use super::{Activation, Outcome};

pub const PAGE_SIZE: u32 = 10;

pub type PageOutcome = Outcome<Result<Vec<Pokemon>, ClientError>>;

/// Fetch of one catalog page.
#[derive(Debug)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
    token: CancellationToken,
}

impl PageRequest {
    pub async fn run(self, client: &impl ClientTrait) -> PageOutcome {
        let result = client.list_catalog(self.limit, self.offset).await;
        Outcome::new(self.token, result)
    }
}

/// Paginates the catalog.
///
/// The service does not report a total count, so paging forward is
/// unbounded and pages past the end are simply empty.
#[derive(Debug, Default)]
pub struct CatalogBrowser {
    page: u32,
    items: Vec<Pokemon>,
    loading: bool,
    error: Option<String>,
    activation: Activation,
    pub detail: DetailViewer,
}

impl CatalogBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)load the current page.
    pub fn activate(&mut self) -> PageRequest {
        self.request_page()
    }

    pub fn next(&mut self) -> PageRequest {
        self.page = self.page.saturating_add(1);
        self.request_page()
    }

    /// Go back one page, `None` on the first page.
    pub fn previous(&mut self) -> Option<PageRequest> {
        if self.page == 0 {
            return None;
        }
        self.page -= 1;
        Some(self.request_page())
    }

    /// Jump to a page, negative indices clamp to the first page.
    pub fn go_to(&mut self, page: i64) -> PageRequest {
        self.page = u32::try_from(page.max(0)).unwrap_or(u32::MAX);
        self.request_page()
    }

    fn request_page(&mut self) -> PageRequest {
        debug!(page = self.page, "requesting catalog page");
        self.loading = true;
        self.error = None;
        PageRequest {
            limit: PAGE_SIZE,
            offset: self.page.saturating_mul(PAGE_SIZE),
            token: self.activation.renew(),
        }
    }

    /// Apply a fetched page, recording its names in `index`.
    ///
    /// A failure keeps the previously shown items next to the error.
    pub fn apply(&mut self, outcome: PageOutcome, index: &mut IdNameIndex) -> bool {
        let Some(result) = outcome.into_current() else {
            return false;
        };
        self.loading = false;
        match result {
            Ok(items) => {
                let added = index.merge(items.iter().map(|item| (item.id, item.name.as_str())));
                debug!(count = items.len(), added, "loaded catalog page");
                self.items = items;
            },
            Err(err) => {
                debug!(%err, "failed to load catalog page");
                self.error = Some(err.to_string());
            },
        }
        true
    }

    /// Open the detail view of the item named `name`.
    pub fn select(&mut self, name: &str) -> DetailRequest {
        self.detail.open(name)
    }

    /// Zero-based index of the current page.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items(&self) -> &[Pokemon] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
