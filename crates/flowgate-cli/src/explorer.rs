//! Interactive explorer: filter panel, diagram and node-click drill-down
//! wired to a [`Gateway`].
//!
//! Panel changes replace the active selection with the panel's selection.
//! A confirmed node click merges a `SOURCE` or `TARGET` restriction into the
//! active selection. Either way the flows are reloaded and redrawn. A 401
//! from a data route logs the session out.

use std::sync::{Arc, Mutex};

use flowgate_core::{FilterField, FilterSelection, FlowRecord};
use flowgate_view::{
    confirmation_prompt, resolve_node_click, DiagramRenderer, FilterPanel, RenderOptions,
    RenderOutcome, ViewError,
};

use crate::client::{ClientError, Gateway, SessionUser};

#[derive(Debug, thiserror::Error)]
pub enum ExploreError {
    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error("not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("render failed: {0}")]
    View(#[from] ViewError),
}

impl ExploreError {
    /// Process exit code: 1 render/usage, 2 authentication, 3 transport.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExploreError::SessionExpired | ExploreError::NotLoggedIn => 2,
            ExploreError::Client(err) if err.is_auth() => 2,
            ExploreError::Client(_) => 3,
            ExploreError::View(_) => 1,
        }
    }
}

pub struct Explorer<G> {
    gateway: G,
    panel: FilterPanel,
    renderer: DiagramRenderer,
    user: Option<SessionUser>,
    selection: FilterSelection,
    records: Vec<FlowRecord>,
    panel_changes: Arc<Mutex<Vec<FilterSelection>>>,
    node_clicks: Arc<Mutex<Vec<String>>>,
}

impl<G: Gateway> Explorer<G> {
    pub fn new(gateway: G, options: RenderOptions) -> Self {
        let panel_changes = Arc::new(Mutex::new(Vec::new()));
        let node_clicks = Arc::new(Mutex::new(Vec::new()));

        let mut panel = FilterPanel::new();
        let sink = Arc::clone(&panel_changes);
        panel.subscribe(move |selection| {
            if let Ok(mut queue) = sink.lock() {
                queue.push(selection.clone());
            }
        });

        let mut renderer = DiagramRenderer::new(options);
        let sink = Arc::clone(&node_clicks);
        renderer.on_node_click(move |label| {
            if let Ok(mut queue) = sink.lock() {
                queue.push(label.to_string());
            }
        });

        Explorer {
            gateway,
            panel,
            renderer,
            user: None,
            selection: FilterSelection::new(),
            records: Vec::new(),
            panel_changes,
            node_clicks,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn panel(&self) -> &FilterPanel {
        &self.panel
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn records(&self) -> &[FlowRecord] {
        &self.records
    }

    pub fn current(&self) -> Option<&RenderOutcome> {
        self.renderer.current()
    }

    /// Exchanges `token` for a session, then loads categories and the
    /// unfiltered diagram.
    pub async fn login(&mut self, token: &str) -> Result<&RenderOutcome, ExploreError> {
        let user = self.gateway.login(token).await?;
        tracing::info!("Signed in as {}", user.email);
        self.user = Some(user);

        self.load_categories().await?;
        self.reload().await
    }

    /// Refreshes the filter panel options.
    pub async fn load_categories(&mut self) -> Result<(), ExploreError> {
        self.require_login()?;
        let result = self.gateway.categories().await;
        let categories = self.guard(result).await?;
        self.panel.on_categories_loaded(&categories);
        Ok(())
    }

    /// Queries flows for the active selection and redraws.
    pub async fn reload(&mut self) -> Result<&RenderOutcome, ExploreError> {
        self.require_login()?;
        let result = self.gateway.flows(&self.selection).await;
        self.records = self.guard(result).await?;
        Ok(self.renderer.render(&self.records)?)
    }

    /// Sets one panel field (`None` or empty clears it) and reloads.
    pub async fn select(
        &mut self,
        field: FilterField,
        value: Option<&str>,
    ) -> Result<&RenderOutcome, ExploreError> {
        self.panel.select(field, value)?;
        self.apply_panel_changes();
        self.reload().await
    }

    /// Clears every panel field and reloads unfiltered.
    pub async fn reset(&mut self) -> Result<&RenderOutcome, ExploreError> {
        self.panel.reset();
        self.apply_panel_changes();
        self.reload().await
    }

    /// Clicks the node labeled `label`. `confirm` is shown the confirmation
    /// text and decides whether the filter is applied. Returns `None` when
    /// no node was clicked or the user declined.
    pub async fn click_node<F>(
        &mut self,
        label: &str,
        confirm: F,
    ) -> Result<Option<&RenderOutcome>, ExploreError>
    where
        F: FnOnce(&str) -> bool,
    {
        self.renderer.click(label);
        self.handle_node_click(confirm).await
    }

    /// Clicks whatever node lies under canvas point `(x, y)`.
    pub async fn click_at<F>(
        &mut self,
        x: f64,
        y: f64,
        confirm: F,
    ) -> Result<Option<&RenderOutcome>, ExploreError>
    where
        F: FnOnce(&str) -> bool,
    {
        self.renderer.click_at(x, y);
        self.handle_node_click(confirm).await
    }

    /// Ends the session and clears local state.
    pub async fn logout(&mut self) {
        if let Err(err) = self.gateway.logout().await {
            tracing::warn!("Logout request failed: {}", err);
        }
        self.user = None;
        self.records.clear();
        self.selection = FilterSelection::new();
        self.panel.reset();
        self.drain_panel_changes();
    }

    async fn handle_node_click<F>(
        &mut self,
        confirm: F,
    ) -> Result<Option<&RenderOutcome>, ExploreError>
    where
        F: FnOnce(&str) -> bool,
    {
        let clicked = self
            .node_clicks
            .lock()
            .map(|mut queue| queue.drain(..).last())
            .unwrap_or(None);
        let Some(label) = clicked else {
            return Ok(None);
        };
        if !confirm(&confirmation_prompt(&label)) {
            return Ok(None);
        }
        let Some(next) = resolve_node_click(&self.records, &self.selection, &label) else {
            return Ok(None);
        };

        tracing::debug!("Node click on '{}' narrows the selection", label);
        self.selection = next;
        self.reload().await.map(Some)
    }

    fn apply_panel_changes(&mut self) {
        if let Some(selection) = self.drain_panel_changes() {
            self.selection = selection;
        }
    }

    fn drain_panel_changes(&mut self) -> Option<FilterSelection> {
        self.panel_changes
            .lock()
            .map(|mut queue| queue.drain(..).last())
            .unwrap_or(None)
    }

    fn require_login(&self) -> Result<(), ExploreError> {
        if self.user.is_none() {
            return Err(ExploreError::NotLoggedIn);
        }
        Ok(())
    }

    /// Passes `result` through, logging out when the session has expired.
    async fn guard<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ExploreError> {
        match result {
            Ok(value) => Ok(value),
            Err(ClientError::SessionExpired) => {
                tracing::warn!("Session expired; logging out");
                self.logout().await;
                Err(ExploreError::SessionExpired)
            }
            Err(err) => Err(err.into()),
        }
    }
}
