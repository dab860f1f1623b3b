//! Theme container.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::state::{Dispatcher, Reducer};
use crate::storage::{load_json, save_json, KeyValueStore, THEME_MODE_KEY};

// == Theme Types ==
/// User preference. Only this is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

/// A concrete colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn opposite(self) -> Self {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub mode: ThemeMode,
    /// Scheme last reported by the platform
    pub platform_scheme: ColorScheme,
    /// Scheme the UI should render with
    pub active_scheme: ColorScheme,
}

impl ThemeState {
    pub fn new(mode: ThemeMode, platform_scheme: ColorScheme) -> Self {
        Self {
            mode,
            platform_scheme,
            active_scheme: resolve(mode, platform_scheme),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.active_scheme == ColorScheme::Dark
    }
}

fn resolve(mode: ThemeMode, platform: ColorScheme) -> ColorScheme {
    match mode {
        ThemeMode::Light => ColorScheme::Light,
        ThemeMode::Dark => ColorScheme::Dark,
        ThemeMode::System => platform,
    }
}

// == Reducer ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    SetMode(ThemeMode),
    PlatformSchemeChanged(ColorScheme),
}

pub struct ThemeReducer;

impl Reducer for ThemeReducer {
    type State = ThemeState;
    type Action = ThemeAction;

    fn reduce(state: &ThemeState, action: ThemeAction) -> ThemeState {
        match action {
            ThemeAction::SetMode(mode) => ThemeState::new(mode, state.platform_scheme),
            ThemeAction::PlatformSchemeChanged(scheme) => ThemeState::new(state.mode, scheme),
        }
    }
}

// == Theme Controller ==
/// Theme container with mode persistence.
pub struct ThemeController {
    dispatcher: Dispatcher<ThemeReducer>,
    store: Arc<dyn KeyValueStore>,
}

impl ThemeController {
    /// Restores the persisted mode (default `System`).
    pub async fn load(store: Arc<dyn KeyValueStore>, platform_scheme: ColorScheme) -> Self {
        let mode: ThemeMode = load_json(store.as_ref(), THEME_MODE_KEY)
            .await
            .unwrap_or_default();
        info!(?mode, ?platform_scheme, "theme loaded");

        Self {
            dispatcher: Dispatcher::new(ThemeState::new(mode, platform_scheme)),
            store,
        }
    }

    pub fn state(&self) -> ThemeState {
        self.dispatcher.state()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<ThemeState> {
        self.dispatcher.subscribe()
    }

    /// Switches the mode and persists it.
    pub async fn set_mode(&self, mode: ThemeMode) -> Result<ThemeState> {
        self.dispatcher.dispatch(ThemeAction::SetMode(mode));
        save_json(self.store.as_ref(), THEME_MODE_KEY, &mode)
            .await
            .map_err(|e| {
                warn!(error = %e, "theme mode kept in memory only");
                AppError::NotPersisted(e)
            })?;
        Ok(self.state())
    }

    /// Pins the mode to the opposite of what is currently shown.
    pub async fn toggle(&self) -> Result<ThemeState> {
        let next = match self.state().active_scheme.opposite() {
            ColorScheme::Light => ThemeMode::Light,
            ColorScheme::Dark => ThemeMode::Dark,
        };
        self.set_mode(next).await
    }

    /// Records a platform scheme change. Only affects `System` mode.
    pub fn platform_scheme_changed(&self, scheme: ColorScheme) -> ThemeState {
        self.dispatcher
            .dispatch(ThemeAction::PlatformSchemeChanged(scheme));
        self.state()
    }
}
