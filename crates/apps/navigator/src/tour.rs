use catalog::CatalogSource;
use navigation::{
    FetchOutcome, MarkerClick, NavigationConfig, NavigationController, NavigationEvent, Step,
    ViewMode,
};
use runtime::{Event, Ticket};
use tracing::{info, warn};

use crate::source::ImageChecker;

/// Walk `ids` through a controller the way a user would: the first id is a
/// marker click, the rest are hotspot clicks. Failed steps are logged and
/// skipped. With `confirm_imagery` set, each panorama's image is checked
/// before it is shown.
pub async fn run_tour<S: CatalogSource>(
    source: &S,
    images: &ImageChecker,
    config: NavigationConfig,
    ids: &[String],
) -> Vec<Event<NavigationEvent>> {
    let mut controller = NavigationController::new(config);

    for id in ids {
        let step = if controller.state().mode() == ViewMode::Map {
            controller.click_marker(&MarkerClick::new(id.clone()))
        } else {
            controller.click_hotspot(id)
        };

        match step {
            Ok(Step::Fetch(ticket)) => {
                info!(%ticket, source = %source.describe(), "loading catalog");
                let result = source.load().await;
                match controller.complete_fetch(ticket, result) {
                    Ok(FetchOutcome::LoadImage(ticket)) => {
                        load_image(&mut controller, images, ticket, id).await
                    }
                    Ok(FetchOutcome::Entered | FetchOutcome::Discarded) => {}
                    Err(err) => warn!(target = %id, %err, "tour step failed"),
                }
            }
            Ok(Step::LoadImage(ticket)) => load_image(&mut controller, images, ticket, id).await,
            Ok(Step::Entered | Step::Ignored) => {}
            Err(err) => warn!(target = %id, %err, "tour step rejected"),
        }
    }

    controller.drain_events()
}

async fn load_image(
    controller: &mut NavigationController,
    images: &ImageChecker,
    ticket: Ticket,
    id: &str,
) {
    let Some(url) = controller.pending_scene().map(|s| s.image_url.clone()) else {
        return;
    };
    let result = images.check(&url).await;
    if let Err(err) = controller.complete_image(ticket, result) {
        warn!(target = %id, %err, "tour step failed");
    }
}

pub fn describe_event(event: &Event<NavigationEvent>) -> String {
    let body = match &event.payload {
        NavigationEvent::ShowPanorama { scene } => {
            let targets: Vec<&str> = scene.hotspots.iter().map(|h| h.target_id()).collect();
            format!(
                "show panorama {} ({}) -> [{}]",
                scene.id,
                scene.mode,
                targets.join(", ")
            )
        }
        NavigationEvent::ShowMap { camera } => format!(
            "show map at {:.1},{:.1} z{}",
            camera.center.lat, camera.center.lng, camera.zoom
        ),
        NavigationEvent::NavigationFailed { target, error } => {
            format!("navigation to {target} failed: {error}")
        }
        NavigationEvent::StaleResultDiscarded { ticket } => {
            format!("discarded stale result {ticket}")
        }
    };
    format!("{:>3} {body}", event.seq)
}

#[cfg(test)]
mod tests {
    use super::{describe_event, run_tour};
    use catalog::{CatalogSnapshot, PanoramaRecord, StaticCatalogSource};
    use navigation::{ImagerySettings, NavigationConfig, NavigationEvent};

    use crate::source::{FileCatalogSource, ImageChecker};

    fn source() -> StaticCatalogSource {
        StaticCatalogSource::new(
            CatalogSnapshot::from_records(vec![
                PanoramaRecord::new("a", 0.0, 0.0),
                PanoramaRecord::new("b", 100.0, 0.0),
                PanoramaRecord::new("c", 2000.0, 0.0),
            ])
            .unwrap(),
        )
    }

    fn images() -> ImageChecker {
        ImageChecker::new(reqwest::Client::new())
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn walks_marker_then_hotspots() {
        let tour = ids(&["a", "b", "a"]);
        let events = run_tour(&source(), &images(), NavigationConfig::default(), &tour).await;
        let visited: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.payload {
                NavigationEvent::ShowPanorama { scene } => Some(scene.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(visited, vec!["a", "b", "a"]);
        assert_eq!(describe_event(&events[0]), "  0 show panorama a (flat) -> [b]");
    }

    #[tokio::test]
    async fn unreachable_step_is_skipped() {
        let tour = ids(&["a", "c", "b"]);
        let events = run_tour(&source(), &images(), NavigationConfig::default(), &tour).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1].payload,
            NavigationEvent::ShowPanorama { scene } if scene.id == "b"
        ));
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FileCatalogSource::new(dir.path().join("feed.json"));
        let events = run_tour(&missing, &images(), NavigationConfig::default(), &ids(&["a"])).await;
        assert_eq!(events.len(), 1);
        assert!(describe_event(&events[0]).contains("navigation to a failed"));
    }

    #[tokio::test]
    async fn missing_image_blocks_the_transition() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();
        let config = NavigationConfig {
            confirm_imagery: true,
            imagery: ImagerySettings {
                base_url: dir.path().display().to_string(),
                extension: "jpg".to_string(),
            },
            ..NavigationConfig::default()
        };

        let events = run_tour(&source(), &images(), config, &ids(&["a", "b"])).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0].payload,
            NavigationEvent::ShowPanorama { scene } if scene.id == "a"
        ));
        assert!(matches!(
            &events[1].payload,
            NavigationEvent::NavigationFailed { target, .. } if target == "b"
        ));
    }
}
