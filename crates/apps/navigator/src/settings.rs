use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use navigation::{AxisSigns, MapViewSettings, NavigationConfig, RenderMode};
use tracing::warn;

pub const DEFAULT_FEED_URL: &str = "https://panoramas.raidcore.gg/data.json";
pub const DEFAULT_ADDR: &str = "127.0.0.1:9200";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, Debug)]
pub struct AppSettings {
    /// http(s) URL or local path of the metadata feed.
    pub feed: String,
    pub addr: SocketAddr,
    /// Upper bound on one feed or image request.
    pub fetch_timeout: Duration,
    pub navigation: NavigationConfig,
    pub map: MapViewSettings,
}

impl AppSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut navigation = NavigationConfig::default();
        navigation.max_distance = var_f64(&lookup, "PANO_MAX_DISTANCE", navigation.max_distance);
        navigation.compass_correction_deg = var_f64(
            &lookup,
            "PANO_COMPASS_CORRECTION_DEG",
            navigation.compass_correction_deg,
        );
        navigation.flat.pitch_deg = var_f64(&lookup, "PANO_PITCH_DEG", navigation.flat.pitch_deg);
        if let Some(base) = lookup("PANO_IMAGE_BASE") {
            navigation.imagery.base_url = base;
        }
        if let Some(ext) = lookup("PANO_IMAGE_EXT") {
            navigation.imagery.extension = ext;
        }

        let mut map = MapViewSettings::default();
        map.axis_signs = AxisSigns::new(
            var_f64(&lookup, "PANO_SIGN_EAST", map.axis_signs.east),
            var_f64(&lookup, "PANO_SIGN_SOUTH", map.axis_signs.south),
        );

        Self {
            feed: lookup("PANO_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            addr: var_addr(&lookup, "PANO_ADDR"),
            fetch_timeout: var_secs(&lookup, "PANO_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS),
            navigation,
            map,
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(
        mut self,
        feed: Option<String>,
        max_distance: Option<f64>,
        mode: Option<RenderMode>,
    ) -> Self {
        if let Some(feed) = feed {
            self.feed = feed;
        }
        if let Some(max_distance) = max_distance {
            self.navigation.max_distance = max_distance;
        }
        if let Some(mode) = mode {
            self.navigation.render_mode = mode;
        }
        self
    }
}

fn var_f64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn var_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Duration {
    let secs = lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}

fn var_addr(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> SocketAddr {
    let fallback = SocketAddr::from(([127, 0, 0, 1], 9200));
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("invalid {key}={raw}, using {DEFAULT_ADDR}");
            fallback
        }),
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::{AppSettings, DEFAULT_ADDR, DEFAULT_FEED_URL};
    use navigation::RenderMode;
    use std::collections::HashMap;
    use std::time::Duration;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSettings::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(&[]);
        assert_eq!(s.feed, DEFAULT_FEED_URL);
        assert_eq!(s.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(s.navigation.max_distance, 500.0);
        assert_eq!(s.navigation.compass_correction_deg, -62.0);
        assert_eq!(s.map.axis_signs.east, 1.0);
        assert_eq!(s.fetch_timeout, Duration::from_secs(15));
    }

    #[test]
    fn reads_environment() {
        let s = settings(&[
            ("PANO_FEED_URL", "feed.json"),
            ("PANO_MAX_DISTANCE", "750"),
            ("PANO_COMPASS_CORRECTION_DEG", "0"),
            ("PANO_PITCH_DEG", "-5"),
            ("PANO_IMAGE_BASE", "https://cdn.example/views"),
            ("PANO_IMAGE_EXT", "webp"),
            ("PANO_SIGN_SOUTH", "-1"),
            ("PANO_ADDR", "0.0.0.0:8080"),
            ("PANO_FETCH_TIMEOUT_SECS", "3"),
        ]);
        assert_eq!(s.feed, "feed.json");
        assert_eq!(s.navigation.max_distance, 750.0);
        assert_eq!(s.navigation.compass_correction_deg, 0.0);
        assert_eq!(s.navigation.flat.pitch_deg, -5.0);
        assert_eq!(s.navigation.imagery.image_url("a"), "https://cdn.example/views/a.webp");
        assert_eq!(s.map.axis_signs.south, -1.0);
        assert_eq!(s.addr.port(), 8080);
        assert_eq!(s.fetch_timeout, Duration::from_secs(3));
    }

    #[test]
    fn garbage_values_fall_back() {
        let s = settings(&[
            ("PANO_MAX_DISTANCE", "far"),
            ("PANO_ADDR", "nowhere"),
            ("PANO_FETCH_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(s.navigation.max_distance, 500.0);
        assert_eq!(s.fetch_timeout, Duration::from_secs(15));
        assert_eq!(s.addr.to_string(), DEFAULT_ADDR);
    }

    #[test]
    fn flags_override_environment() {
        let s = settings(&[("PANO_MAX_DISTANCE", "750")]).with_overrides(
            Some("local.json".to_string()),
            Some(100.0),
            Some(RenderMode::Spherical),
        );
        assert_eq!(s.feed, "local.json");
        assert_eq!(s.navigation.max_distance, 100.0);
        assert_eq!(s.navigation.render_mode, RenderMode::Spherical);
    }
}
