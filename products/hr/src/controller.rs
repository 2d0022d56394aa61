//! List page controller.
//!
//! [`ListState`] holds the paged, filtered and selected view of one entity
//! and exposes pure transitions. [`ListController`] runs that state on a
//! tokio task: events arrive over an mpsc channel, fetches are spawned
//! against an [`EntityService`], and snapshots are published on a watch
//! channel.
//!
//! Every fetch is stamped with a generation number. Only the result of the
//! most recently issued fetch is applied; older results that resolve late
//! are dropped, so overlapping page and search changes cannot overwrite
//! newer data.

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, warn};

use crate::{
    config::HrConfig,
    error::{HrError, HrResult},
    pagination,
    service::{EntityService, ListQuery, Page, Record, total_pages},
    view::ViewMode,
};

const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub search_debounce: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&HrConfig::default())
    }
}

impl From<&HrConfig> for ControllerOptions {
    fn from(config: &HrConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            search_debounce: config.search_debounce(),
        }
    }
}

/// User input understood by a list controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListEvent {
    ChangePage(u32),
    NextPage,
    PreviousPage,
    Search(String),
    ToggleOne(String),
    ToggleAll,
    SetViewMode(ViewMode),
    ToggleViewMode,
    Retry,
}

/// What the driver has to do after an event was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Fetch,
    Debounce,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Clone, Debug)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub current_page: u32,
    pub total_pages: u32,
    pub total: usize,
    pub page_size: u32,
    pub search_term: String,
    pub selected_ids: HashSet<String>,
    pub select_all: bool,
    pub view_mode: ViewMode,
    pub last_error: Option<String>,
    pub debounce_pending: bool,
    generation: u64,
    events_processed: u64,
}

impl<T: Record> ListState<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            current_page: 1,
            total_pages: 0,
            total: 0,
            page_size: page_size.max(1),
            search_term: String::new(),
            selected_ids: HashSet::new(),
            select_all: false,
            view_mode: ViewMode::default(),
            last_error: None,
            debounce_pending: false,
            generation: 0,
            events_processed: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Query for the current page and search term.
    pub fn query(&self) -> ListQuery {
        let mut query = ListQuery::new(self.current_page, self.page_size);
        let term = self.search_term.trim();
        if !term.is_empty() {
            query = query.with_search(term);
        }
        query
    }

    pub fn begin_fetch(&mut self) -> (u64, ListQuery) {
        self.generation += 1;
        self.loading = true;
        (self.generation, self.query())
    }

    pub fn finish_fetch(&mut self, generation: u64, result: HrResult<Page<T>>) -> FetchOutcome {
        if generation != self.generation {
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.total_pages = total_pages(page.total, self.page_size);
                self.total = page.total;
                self.items = page.items;
                self.selected_ids.clear();
                self.select_all = false;
                self.last_error = None;
                FetchOutcome::Applied
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Move to `page`, clamped to the known page range. Returns whether
    /// the current page changed.
    pub fn change_page(&mut self, page: u32) -> bool {
        let target = pagination::clamp_page(page, self.total_pages);
        if target == self.current_page {
            return false;
        }
        self.current_page = target;
        true
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.contains(id)
    }

    /// Flip one id on the current page. Ids not on the page are ignored.
    pub fn toggle_one(&mut self, id: &str) -> bool {
        if !self.items.iter().any(|item| item.id() == id) {
            return false;
        }
        if !self.selected_ids.remove(id) {
            self.selected_ids.insert(id.to_string());
        }
        self.select_all = self.selected_ids.len() == self.items.len();
        true
    }

    pub fn toggle_all(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.select_all {
            self.selected_ids.clear();
            self.select_all = false;
        } else {
            self.selected_ids = self.items.iter().map(|item| item.id().to_string()).collect();
            self.select_all = true;
        }
    }

    /// Loaded, error-free and empty: render the "no data" state.
    pub fn shows_no_data(&self) -> bool {
        !self.loading && self.last_error.is_none() && self.items.is_empty()
    }

    pub fn apply(&mut self, event: ListEvent) -> Effect {
        match event {
            ListEvent::ChangePage(page) => fetch_if(self.change_page(page)),
            ListEvent::NextPage => {
                let next = pagination::next_page(self.current_page, self.total_pages);
                fetch_if(self.change_page(next))
            }
            ListEvent::PreviousPage => {
                let previous = pagination::previous_page(self.current_page);
                fetch_if(self.change_page(previous))
            }
            ListEvent::Search(term) => {
                if term.trim() == self.search_term.trim() {
                    self.search_term = term;
                    return Effect::None;
                }
                self.search_term = term;
                self.debounce_pending = true;
                Effect::Debounce
            }
            ListEvent::ToggleOne(id) => {
                self.toggle_one(&id);
                Effect::None
            }
            ListEvent::ToggleAll => {
                self.toggle_all();
                Effect::None
            }
            ListEvent::SetViewMode(mode) => {
                self.view_mode = mode;
                Effect::None
            }
            ListEvent::ToggleViewMode => {
                self.view_mode = self.view_mode.toggled();
                Effect::None
            }
            ListEvent::Retry => Effect::Fetch,
        }
    }

    /// The debounce elapsed: go back to page 1. The page change and the
    /// refetch are one step, so only a single fetch is issued.
    pub fn debounce_elapsed(&mut self) {
        self.debounce_pending = false;
        self.current_page = 1;
    }
}

fn fetch_if(changed: bool) -> Effect {
    if changed { Effect::Fetch } else { Effect::None }
}

type FetchResult<T> = (u64, HrResult<Page<T>>);

/// Handle to a running list controller task.
pub struct ListController<T: Record> {
    events: mpsc::Sender<ListEvent>,
    state: watch::Receiver<ListState<T>>,
    sent: AtomicU64,
    task: JoinHandle<()>,
}

impl<T: Record> ListController<T> {
    /// Spawn the controller and issue the initial (mount) fetch.
    pub fn spawn(service: Arc<dyn EntityService<T>>, options: ControllerOptions) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ListState::new(options.page_size));
        let task = tokio::spawn(run(service, options, events_rx, state_tx));
        Self {
            events: events_tx,
            state: state_rx,
            sent: AtomicU64::new(0),
            task,
        }
    }

    pub async fn send(&self, event: ListEvent) -> HrResult<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| HrError::Unavailable("list controller stopped".into()))?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn snapshot(&self) -> ListState<T> {
        self.state.borrow().clone()
    }

    /// Wait until every sent event is handled and no fetch or debounce
    /// is outstanding.
    pub async fn settled(&self) -> HrResult<ListState<T>> {
        let sent = self.sent.load(Ordering::SeqCst);
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|s| s.events_processed >= sent && !s.loading && !s.debounce_pending)
            .await
            .map_err(|_| HrError::Unavailable("list controller stopped".into()))?;
        Ok((*state).clone())
    }

    pub async fn shutdown(self) {
        let Self { events, task, .. } = self;
        drop(events);
        let _ = task.await;
    }
}

async fn run<T: Record>(
    service: Arc<dyn EntityService<T>>,
    options: ControllerOptions,
    mut events: mpsc::Receiver<ListEvent>,
    state_tx: watch::Sender<ListState<T>>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<FetchResult<T>>();
    let mut state = ListState::<T>::new(options.page_size);
    let mut debounce_at: Option<Instant> = None;

    spawn_fetch(&service, &mut state, &done_tx);
    state_tx.send_replace(state.clone());

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match state.apply(event) {
                    Effect::Fetch => spawn_fetch(&service, &mut state, &done_tx),
                    Effect::Debounce => {
                        debounce_at = Some(Instant::now() + options.search_debounce);
                    }
                    Effect::None => {}
                }
                state.events_processed += 1;
            }
            Some((generation, result)) = done_rx.recv() => {
                match state.finish_fetch(generation, result) {
                    FetchOutcome::Applied => debug!(
                        kind = T::KIND.as_str(),
                        generation,
                        total = state.total,
                        "list updated"
                    ),
                    FetchOutcome::Failed => warn!(
                        kind = T::KIND.as_str(),
                        generation,
                        error = state.last_error.as_deref().unwrap_or_default(),
                        "list fetch failed; keeping previous items"
                    ),
                    FetchOutcome::Stale => debug!(
                        kind = T::KIND.as_str(),
                        generation,
                        latest = state.generation(),
                        "dropping stale list result"
                    ),
                }
            }
            _ = sleep_until(debounce_at.unwrap_or_else(Instant::now)), if debounce_at.is_some() => {
                debounce_at = None;
                state.debounce_elapsed();
                spawn_fetch(&service, &mut state, &done_tx);
            }
        }
        state_tx.send_replace(state.clone());
    }
}

fn spawn_fetch<T: Record>(
    service: &Arc<dyn EntityService<T>>,
    state: &mut ListState<T>,
    done: &mpsc::UnboundedSender<FetchResult<T>>,
) {
    let (generation, query) = state.begin_fetch();
    debug!(
        kind = T::KIND.as_str(),
        generation,
        page = query.page,
        search = query.search.as_deref().unwrap_or_default(),
        "fetching list"
    );
    let service = Arc::clone(service);
    let done = done.clone();
    tokio::spawn(async move {
        let result = service.list(&query).await;
        let _ = done.send((generation, result));
    });
}
