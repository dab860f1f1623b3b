//! State Module
//!
//! Single-writer state containers. Each container is a pure reducer
//! `(state, action) -> state` behind a [`Dispatcher`] that publishes every
//! new state on a watch channel for the UI layer to observe.

mod favorites;
mod movies;
mod theme;

use std::marker::PhantomData;

use tokio::sync::watch;

pub use favorites::{FavoritesContainer, FavoritesSnapshot};
pub use movies::{
    ListState, LoadStatus, MovieList, MoviesAction, MoviesController, MoviesReducer, MoviesState,
};
pub use theme::{ColorScheme, ThemeAction, ThemeController, ThemeMode, ThemeReducer, ThemeState};

// == Reducer ==
/// Deterministic state transition: the same state and action always yield
/// the same next state.
pub trait Reducer {
    type State: Clone;
    type Action;

    fn reduce(state: &Self::State, action: Self::Action) -> Self::State;
}

// == Dispatcher ==
/// Holds the current state of one container and applies actions in order.
pub struct Dispatcher<R: Reducer> {
    tx: watch::Sender<R::State>,
    _reducer: PhantomData<fn() -> R>,
}

impl<R: Reducer> Dispatcher<R> {
    pub fn new(initial: R::State) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            _reducer: PhantomData,
        }
    }

    /// Applies an action and publishes the resulting state.
    pub fn dispatch(&self, action: R::Action) {
        let next = {
            let current = self.tx.borrow();
            R::reduce(&current, action)
        };
        self.tx.send_replace(next);
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> R::State {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.tx.subscribe()
    }
}
