//! Movie browsing container.
//!
//! Tracks one paginated list per category plus the search results. Every
//! fetch is tagged with a monotonically increasing request id; a response
//! whose id is not the latest dispatched for its list is discarded, so a
//! slow superseded request can never overwrite newer data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::catalog::CachedCatalog;
use crate::error::{ApiError, AppError, Result};
use crate::library::SearchHistory;
use crate::models::{Movie, MovieCategory, MoviePage};
use crate::state::{Dispatcher, Reducer};

// == List Identity ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieList {
    Category(MovieCategory),
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

// == List State ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListState {
    pub movies: Vec<Movie>,
    pub current_page: u32,
    pub total_pages: u32,
    pub status: LoadStatus,
    /// Id of the most recent fetch dispatched for this list
    #[serde(skip)]
    pub latest_request: u64,
}

impl ListState {
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

// == Movies State ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesState {
    pub popular: ListState,
    pub top_rated: ListState,
    pub upcoming: ListState,
    pub now_playing: ListState,
    pub search: ListState,
    pub search_query: String,
    pub is_loading: bool,
    pub is_search_loading: bool,
    pub error: Option<ApiError>,
}

impl MoviesState {
    pub fn list(&self, list: MovieList) -> &ListState {
        match list {
            MovieList::Category(MovieCategory::Popular) => &self.popular,
            MovieList::Category(MovieCategory::TopRated) => &self.top_rated,
            MovieList::Category(MovieCategory::Upcoming) => &self.upcoming,
            MovieList::Category(MovieCategory::NowPlaying) => &self.now_playing,
            MovieList::Search => &self.search,
        }
    }

    fn list_mut(&mut self, list: MovieList) -> &mut ListState {
        match list {
            MovieList::Category(MovieCategory::Popular) => &mut self.popular,
            MovieList::Category(MovieCategory::TopRated) => &mut self.top_rated,
            MovieList::Category(MovieCategory::Upcoming) => &mut self.upcoming,
            MovieList::Category(MovieCategory::NowPlaying) => &mut self.now_playing,
            MovieList::Search => &mut self.search,
        }
    }

    fn refresh_loading_flags(&mut self) {
        self.is_loading = MovieCategory::ALL
            .iter()
            .any(|c| self.list(MovieList::Category(*c)).is_loading());
        self.is_search_loading = self.search.is_loading();
    }
}

// == Actions ==
#[derive(Debug, Clone, PartialEq)]
pub enum MoviesAction {
    FetchStarted {
        list: MovieList,
        page: u32,
        request_id: u64,
    },
    FetchSucceeded {
        list: MovieList,
        request_id: u64,
        page: MoviePage,
    },
    FetchFailed {
        list: MovieList,
        request_id: u64,
        error: ApiError,
    },
    SetSearchQuery(String),
    ClearSearch,
    ClearError,
}

// == Reducer ==
pub struct MoviesReducer;

impl Reducer for MoviesReducer {
    type State = MoviesState;
    type Action = MoviesAction;

    fn reduce(state: &MoviesState, action: MoviesAction) -> MoviesState {
        let mut next = state.clone();

        match action {
            MoviesAction::FetchStarted {
                list, request_id, ..
            } => {
                let target = next.list_mut(list);
                if request_id < target.latest_request {
                    return next;
                }
                target.latest_request = request_id;
                target.status = LoadStatus::Loading;
                next.error = None;
                next.refresh_loading_flags();
            }
            MoviesAction::FetchSucceeded {
                list,
                request_id,
                page,
            } => {
                let target = next.list_mut(list);
                if request_id != target.latest_request {
                    return next;
                }
                if page.page <= 1 {
                    target.movies = page.results;
                } else {
                    for movie in page.results {
                        if !target.movies.iter().any(|m| m.id == movie.id) {
                            target.movies.push(movie);
                        }
                    }
                }
                target.current_page = page.page;
                target.total_pages = page.total_pages;
                target.status = LoadStatus::Idle;
                next.refresh_loading_flags();
            }
            MoviesAction::FetchFailed {
                list,
                request_id,
                error,
            } => {
                let target = next.list_mut(list);
                if request_id != target.latest_request {
                    return next;
                }
                // Previously loaded movies stay visible.
                target.status = LoadStatus::Error;
                next.error = Some(error);
                next.is_loading = false;
                next.is_search_loading = false;
            }
            MoviesAction::SetSearchQuery(query) => {
                next.search_query = query;
            }
            MoviesAction::ClearSearch => {
                next.search_query.clear();
                next.search = ListState::default();
                next.refresh_loading_flags();
            }
            MoviesAction::ClearError => {
                next.error = None;
                for list in MovieCategory::ALL
                    .map(MovieList::Category)
                    .into_iter()
                    .chain([MovieList::Search])
                {
                    let target = next.list_mut(list);
                    if target.status == LoadStatus::Error {
                        target.status = LoadStatus::Idle;
                    }
                }
            }
        }

        next
    }
}

// == Movies Controller ==
/// Drives the movies reducer against the cached catalog.
pub struct MoviesController {
    dispatcher: Dispatcher<MoviesReducer>,
    catalog: CachedCatalog,
    history: Arc<Mutex<SearchHistory>>,
    next_request: AtomicU64,
}

impl MoviesController {
    pub fn new(catalog: CachedCatalog, history: Arc<Mutex<SearchHistory>>) -> Self {
        Self {
            dispatcher: Dispatcher::new(MoviesState::default()),
            catalog,
            history,
            next_request: AtomicU64::new(1),
        }
    }

    pub fn state(&self) -> MoviesState {
        self.dispatcher.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<MoviesState> {
        self.dispatcher.subscribe()
    }

    pub fn dispatch(&self, action: MoviesAction) {
        self.dispatcher.dispatch(action);
    }

    // == Loading ==
    /// Loads the first page of a category, replacing what is shown.
    pub async fn load(&self, category: MovieCategory) -> Result<()> {
        self.fetch(MovieList::Category(category), 1).await
    }

    /// Drops the cached first page and loads it again.
    pub async fn refresh(&self, category: MovieCategory) -> Result<()> {
        self.catalog.cache().invalidate_movie_list(category, 1).await;
        self.load(category).await
    }

    /// Appends the next page. No-op when on the last page or already loading.
    pub async fn load_more(&self, list: MovieList) -> Result<()> {
        let current = self.state();
        let target = current.list(list);
        if target.is_loading() || !target.has_more_pages() {
            debug!(?list, "nothing more to load");
            return Ok(());
        }
        if list == MovieList::Search && current.search_query.is_empty() {
            return Ok(());
        }
        self.fetch(list, target.current_page + 1).await
    }

    // == Search ==
    /// Runs a new search and remembers the query. A blank query clears the
    /// search results instead.
    pub async fn search(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            self.clear_search();
            return Ok(());
        }

        self.dispatch(MoviesAction::SetSearchQuery(query.to_string()));
        if let Err(e) = self.history.lock().await.record(query).await {
            if !e.is_applied() {
                return Err(e);
            }
        }
        self.fetch(MovieList::Search, 1).await
    }

    pub fn clear_search(&self) {
        self.dispatch(MoviesAction::ClearSearch);
    }

    async fn fetch(&self, list: MovieList, page: u32) -> Result<()> {
        let request_id = self.next_request.fetch_add(1, Ordering::SeqCst);
        self.dispatch(MoviesAction::FetchStarted {
            list,
            page,
            request_id,
        });

        let result = match list {
            MovieList::Category(category) => self.catalog.movie_list(category, page).await,
            MovieList::Search => {
                let query = self.state().search_query;
                self.catalog.search(&query, page).await
            }
        };

        match result {
            Ok(page) => {
                self.dispatch(MoviesAction::FetchSucceeded {
                    list,
                    request_id,
                    page,
                });
                Ok(())
            }
            Err(error) => {
                warn!(?list, %error, "movie fetch failed");
                self.dispatch(MoviesAction::FetchFailed {
                    list,
                    request_id,
                    error: error.clone(),
                });
                Err(AppError::Remote(error))
            }
        }
    }
}
