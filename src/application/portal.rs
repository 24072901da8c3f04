//! Portal state: active section, selection and navigation
//!
//! Views do not talk to each other directly. They get a `Navigator` and send
//! typed `NavigationIntent`s; the portal applies them in order when
//! `process_pending` runs.

use std::fmt;
use std::sync::mpsc::{self, Receiver, SendError, Sender};

use tracing::{debug, instrument, warn};

use crate::application::services::{LocationDetail, LocationService};
use crate::domain::{LocationForest, LocationId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Dashboard,
    Files,
    Locations,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Dashboard => write!(f, "Dashboard"),
            Section::Files => write!(f, "My SDS Files"),
            Section::Locations => write!(f, "Locations"),
        }
    }
}

/// Requests a view can make of the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    ViewLocation(LocationId),
    ViewDocument(String),
}

/// Sending half handed to views.
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: Sender<NavigationIntent>,
}

impl Navigator {
    pub fn send(&self, intent: NavigationIntent) -> Result<(), SendError<NavigationIntent>> {
        self.tx.send(intent)
    }

    pub fn view_location(
        &self,
        id: impl Into<LocationId>,
    ) -> Result<(), SendError<NavigationIntent>> {
        self.send(NavigationIntent::ViewLocation(id.into()))
    }

    pub fn view_document(&self, id: impl Into<String>) -> Result<(), SendError<NavigationIntent>> {
        self.send(NavigationIntent::ViewDocument(id.into()))
    }
}

/// Headline numbers of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_sds: u64,
    pub locations: usize,
    pub favorites: usize,
    pub roots: usize,
    pub depth: usize,
}

impl DashboardSummary {
    #[instrument(level = "debug", skip(forest))]
    pub fn from_forest(forest: &LocationForest) -> Self {
        let (total_sds, favorites) =
            forest
                .iter()
                .fold((0u64, 0usize), |(total, favorites), (_, node)| {
                    (
                        total + u64::from(node.data.sds_count_or_default()),
                        favorites + usize::from(node.data.favorite),
                    )
                });
        Self {
            total_sds,
            locations: forest.len(),
            favorites,
            roots: forest.roots().len(),
            depth: forest.depth(),
        }
    }
}

/// Portal container owning the location service and the view state.
pub struct Portal {
    service: LocationService,
    section: Section,
    selected_location: Option<LocationId>,
    selected_document: Option<String>,
    tx: Sender<NavigationIntent>,
    rx: Receiver<NavigationIntent>,
}

impl Portal {
    pub fn new(service: LocationService) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            section: Section::default(),
            selected_location: None,
            selected_document: None,
            tx,
            rx,
        }
    }

    pub fn navigator(&self) -> Navigator {
        Navigator {
            tx: self.tx.clone(),
        }
    }

    pub fn service(&self) -> &LocationService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut LocationService {
        &mut self.service
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn show(&mut self, section: Section) {
        self.section = section;
    }

    pub fn selected_location(&self) -> Option<&str> {
        self.selected_location.as_deref()
    }

    pub fn selected_document(&self) -> Option<&str> {
        self.selected_document.as_deref()
    }

    /// Detail of the selected location, if any.
    pub fn location_detail(&self) -> Option<LocationDetail> {
        self.selected_location
            .as_deref()
            .and_then(|id| self.service.select(id))
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::from_forest(self.service.forest())
    }

    /// Apply all queued intents in order and return how many were applied.
    ///
    /// Intents naming an unknown location are dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(intent) = self.rx.try_recv() {
            if self.apply(intent) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, intent: NavigationIntent) -> bool {
        debug!("navigation: {:?}", intent);
        match intent {
            NavigationIntent::ViewLocation(id) => {
                if !self.service.forest().contains(&id) {
                    warn!("ignoring navigation to unknown location {}", id);
                    return false;
                }
                self.section = Section::Locations;
                self.selected_location = Some(id);
            }
            NavigationIntent::ViewDocument(id) => {
                self.section = Section::Files;
                self.selected_document = Some(id);
            }
        }
        true
    }
}
