//! Map/panorama state machine.
//!
//! The controller is the only writer of [`NavigationState`]. It never
//! performs IO: when it needs the metadata feed it hands the host a
//! [`Ticket`] and waits for [`NavigationController::complete_fetch`]. With
//! `confirm_imagery` set, the built scene is held back the same way until
//! [`NavigationController::complete_image`] reports the texture. Tickets
//! are latest-wins, so a slow fetch for a panorama the user has already
//! moved past is dropped on arrival instead of being applied.

use std::sync::Arc;

use catalog::{CatalogSnapshot, FetchError};
use runtime::{Event, EventBus, Ticket, TicketIssuer};
use tracing::{debug, info, warn};

use crate::config::{CatalogPolicy, NavigationConfig};
use crate::error::NavigationError;
use crate::hotspot::Hotspot;
use crate::map::{MapCamera, MarkerClick};
use crate::scene::{PanoramaScene, build_scene};
use crate::state::{NavigationState, ViewMode};

/// What the view layer should react to, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    ShowPanorama { scene: PanoramaScene },
    ShowMap { camera: MapCamera },
    NavigationFailed { target: String, error: NavigationError },
    StaleResultDiscarded { ticket: Ticket },
}

/// Result of a navigation request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    /// The target panorama is now active.
    Entered,
    /// The host must load the catalog and report back with this ticket.
    Fetch(Ticket),
    /// The host must load the texture of [`NavigationController::pending_scene`]
    /// and report back with this ticket.
    LoadImage(Ticket),
    /// The input does not apply to the current view.
    Ignored,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Entered,
    /// Catalog ready; the texture must be confirmed with this ticket.
    LoadImage(Ticket),
    /// The ticket had been superseded or cancelled; state is unchanged.
    Discarded,
}

#[derive(Debug)]
pub struct NavigationController {
    config: NavigationConfig,
    state: NavigationState,
    scene: Option<PanoramaScene>,
    catalog: Option<Arc<CatalogSnapshot>>,
    /// Ticket that produced `catalog`; `None` for a preloaded snapshot.
    catalog_ticket: Option<Ticket>,
    tickets: TicketIssuer,
    /// Target of an outstanding catalog fetch.
    pending_target: Option<String>,
    /// Scene waiting on its texture.
    pending_scene: Option<PanoramaScene>,
    map_camera: MapCamera,
    events: EventBus<NavigationEvent>,
}

/// What opening a built scene led to.
enum Opened {
    Now,
    AwaitingImage(Ticket),
}

impl NavigationController {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            state: NavigationState::Map,
            scene: None,
            catalog: None,
            catalog_ticket: None,
            tickets: TicketIssuer::new(),
            pending_target: None,
            pending_scene: None,
            map_camera: MapCamera::default(),
            events: EventBus::new(),
        }
    }

    /// Start with a catalog already loaded (e.g. the one used for the map).
    pub fn with_catalog(mut self, snapshot: CatalogSnapshot) -> Self {
        self.catalog = Some(Arc::new(snapshot));
        self.catalog_ticket = None;
        self
    }

    pub fn with_map_camera(mut self, camera: MapCamera) -> Self {
        self.map_camera = camera;
        self
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn scene(&self) -> Option<&PanoramaScene> {
        self.scene.as_ref()
    }

    /// Live hotspots. Empty on the map.
    pub fn hotspots(&self) -> &[Hotspot] {
        self.scene.as_ref().map_or(&[], |s| s.hotspots.as_slice())
    }

    pub fn catalog(&self) -> Option<&CatalogSnapshot> {
        self.catalog.as_deref()
    }

    /// The outstanding fetch (catalog or texture) and the panorama it will
    /// open.
    pub fn pending(&self) -> Option<(Ticket, &str)> {
        let ticket = self.tickets.current()?;
        let target = match (&self.pending_target, &self.pending_scene) {
            (Some(target), _) => target.as_str(),
            (None, Some(scene)) => scene.id.as_str(),
            (None, None) => return None,
        };
        Some((ticket, target))
    }

    /// Scene whose texture the host is loading. Not visible yet.
    pub fn pending_scene(&self) -> Option<&PanoramaScene> {
        self.pending_scene.as_ref()
    }

    pub fn map_camera(&self) -> MapCamera {
        self.map_camera
    }

    /// Record pan/zoom reported by the map so it can be restored later.
    pub fn set_map_camera(&mut self, camera: MapCamera) {
        self.map_camera = camera;
    }

    /// Forget the snapshot; the next visit fetches the feed again.
    pub fn invalidate_catalog(&mut self) {
        if self.catalog.take().is_some() {
            debug!("catalog snapshot invalidated");
        }
        self.catalog_ticket = None;
    }

    pub fn events(&self) -> &[Event<NavigationEvent>] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event<NavigationEvent>> {
        self.events.drain()
    }

    /// Map marker clicked.
    pub fn click_marker(&mut self, click: &MarkerClick) -> Result<Step, NavigationError> {
        if self.state.mode() != ViewMode::Map {
            warn!(target_id = %click.panorama_id, "marker click while the map is hidden");
            return Ok(Step::Ignored);
        }
        self.request(&click.panorama_id)
    }

    /// Directional hotspot clicked inside the active panorama.
    ///
    /// Only targets in the live hotspot set are accepted; a click that
    /// belongs to an earlier scene fails with `NotFound`.
    pub fn click_hotspot(&mut self, target_id: &str) -> Result<Step, NavigationError> {
        let Some(scene) = &self.scene else {
            warn!(target_id, "hotspot click without an open panorama");
            return Ok(Step::Ignored);
        };
        if !scene.has_hotspot_to(target_id) {
            warn!(from = %scene.id, target_id, "stale hotspot click rejected");
            return Err(NavigationError::NotFound(target_id.to_string()));
        }
        self.request(target_id)
    }

    /// Close control: back to the map at the last known camera.
    ///
    /// Also cancels any fetch in flight. Returns `false` if the map was
    /// already showing.
    pub fn close(&mut self) -> bool {
        self.cancel_pending();
        if self.state.mode() == ViewMode::Map {
            return false;
        }
        self.scene = None;
        self.state = NavigationState::Map;
        info!("returned to map");
        self.events.emit(NavigationEvent::ShowMap {
            camera: self.map_camera,
        });
        true
    }

    pub fn cancel_pending(&mut self) -> Option<Ticket> {
        self.pending_target = None;
        self.pending_scene = None;
        let cancelled = self.tickets.cancel();
        if let Some(ticket) = cancelled {
            debug!(%ticket, "pending fetch cancelled");
        }
        cancelled
    }

    /// Deliver the result of the fetch started for `ticket`.
    ///
    /// A snapshot from any fetch may refresh the catalog (never replacing a
    /// newer one), but only the current ticket may change the view.
    pub fn complete_fetch(
        &mut self,
        ticket: Ticket,
        result: Result<CatalogSnapshot, FetchError>,
    ) -> Result<FetchOutcome, NavigationError> {
        // A texture ticket is never retired by a catalog result.
        let current = self.pending_target.is_some() && self.tickets.settle(ticket);
        match result {
            Err(err) => {
                if !current {
                    self.discard(ticket);
                    return Ok(FetchOutcome::Discarded);
                }
                let target = self.pending_target.take().unwrap_or_default();
                let error = NavigationError::Fetch(err);
                warn!(%ticket, target = %target, %error, "catalog fetch failed");
                self.events.emit(NavigationEvent::NavigationFailed {
                    target,
                    error: error.clone(),
                });
                Err(error)
            }
            Ok(snapshot) => {
                self.install_catalog(ticket, snapshot);
                if !current {
                    self.discard(ticket);
                    return Ok(FetchOutcome::Discarded);
                }
                let Some(target) = self.pending_target.take() else {
                    return Ok(FetchOutcome::Discarded);
                };
                match self.enter(&target)? {
                    Opened::Now => Ok(FetchOutcome::Entered),
                    Opened::AwaitingImage(ticket) => Ok(FetchOutcome::LoadImage(ticket)),
                }
            }
        }
    }

    /// Deliver the texture load started for `ticket`.
    ///
    /// Success shows the held scene. A failure leaves the current view and
    /// hotspots as they were. Results for superseded or cancelled tickets
    /// are discarded.
    pub fn complete_image(
        &mut self,
        ticket: Ticket,
        result: Result<(), FetchError>,
    ) -> Result<FetchOutcome, NavigationError> {
        if self.pending_scene.is_none() || !self.tickets.settle(ticket) {
            self.discard(ticket);
            return Ok(FetchOutcome::Discarded);
        }
        let Some(scene) = self.pending_scene.take() else {
            return Ok(FetchOutcome::Discarded);
        };
        match result {
            Ok(()) => {
                self.show(scene);
                Ok(FetchOutcome::Entered)
            }
            Err(err) => {
                let error = NavigationError::Fetch(err);
                warn!(
                    %ticket,
                    target = %scene.id,
                    url = %scene.image_url,
                    %error,
                    "panorama image failed"
                );
                self.events.emit(NavigationEvent::NavigationFailed {
                    target: scene.id,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    fn request(&mut self, target: &str) -> Result<Step, NavigationError> {
        let needs_fetch = match self.config.catalog_policy {
            CatalogPolicy::Snapshot => self.catalog.is_none(),
            CatalogPolicy::RefetchEachVisit => true,
        };
        if needs_fetch {
            let ticket = self.tickets.issue();
            self.pending_scene = None;
            if let Some(previous) = self.pending_target.replace(target.to_string()) {
                debug!(superseded = %previous, target, "newer navigation request");
            }
            debug!(%ticket, target, "catalog fetch requested");
            return Ok(Step::Fetch(ticket));
        }

        self.cancel_pending();
        match self.enter(target)? {
            Opened::Now => Ok(Step::Entered),
            Opened::AwaitingImage(ticket) => Ok(Step::LoadImage(ticket)),
        }
    }

    fn install_catalog(&mut self, ticket: Ticket, snapshot: CatalogSnapshot) {
        if self.catalog_ticket.is_some_and(|installed| installed > ticket) {
            debug!(%ticket, "older catalog snapshot ignored");
            return;
        }
        if let Some(old) = &self.catalog {
            if old.version() != snapshot.version() {
                info!(
                    old = old.version(),
                    new = snapshot.version(),
                    panoramas = snapshot.len(),
                    "catalog changed"
                );
            }
        }
        self.catalog = Some(Arc::new(snapshot));
        self.catalog_ticket = Some(ticket);
    }

    fn discard(&mut self, ticket: Ticket) {
        debug!(%ticket, "stale fetch result discarded");
        self.events
            .emit(NavigationEvent::StaleResultDiscarded { ticket });
    }

    /// Build the scene for `target`, then show it or hold it for its
    /// texture.
    fn enter(&mut self, target: &str) -> Result<Opened, NavigationError> {
        let built = match &self.catalog {
            Some(catalog) => build_scene(target, catalog, &self.config),
            None => Err(NavigationError::NotFound(target.to_string())),
        };
        match built {
            Ok(scene) if self.config.confirm_imagery => {
                let ticket = self.tickets.issue();
                debug!(%ticket, url = %scene.image_url, "panorama image requested");
                self.pending_scene = Some(scene);
                Ok(Opened::AwaitingImage(ticket))
            }
            Ok(scene) => {
                self.show(scene);
                Ok(Opened::Now)
            }
            Err(error) => {
                warn!(target, %error, "navigation failed");
                self.events.emit(NavigationEvent::NavigationFailed {
                    target: target.to_string(),
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// State and hotspots change together or not at all.
    fn show(&mut self, scene: PanoramaScene) {
        info!(
            panorama = %scene.id,
            hotspots = scene.hotspots.len(),
            "entered panorama"
        );
        self.state = NavigationState::Panorama {
            active_id: scene.id.clone(),
        };
        self.scene = Some(scene.clone());
        self.events.emit(NavigationEvent::ShowPanorama { scene });
    }
}
