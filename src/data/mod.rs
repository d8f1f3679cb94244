pub mod topology;

use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use reqwest::header::{HeaderValue, USER_AGENT};

use crate::country::{CountryFeature, CountryId};
use crate::error::LoadError;

/// World country boundaries, 1:110m Natural Earth, as TopoJSON
pub const WORLD_ATLAS_URL: &str = "https://unpkg.com/world-atlas/countries-110m.json";

/// Object collection holding one geometry per country
pub const COUNTRIES_OBJECT: &str = "countries";

const USER_AGENT_VALUE: &str = concat!("tui-globe/", env!("CARGO_PKG_VERSION"));

/// Result of the one load attempt
pub type LoadResult = Result<Vec<CountryFeature>, LoadError>;

/// Something that can produce the raw bytes of a topology document
pub trait TopologySource {
    /// Human-readable origin, used in logs
    fn describe(&self) -> String;

    /// Retrieve the whole document
    fn fetch(&self) -> Result<Vec<u8>, LoadError>;
}

/// Fetch the document with a single HTTP GET
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl TopologySource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LoadError::Network(format!("failed to create HTTP client: {e}")))?;

        let response = client
            .get(&self.url)
            .header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Fetch the topology and convert the named object into country features.
///
/// Any failure ends the attempt; there are no partial results and no retry.
pub fn load_countries(source: &impl TopologySource, object: &str) -> LoadResult {
    let started = Instant::now();
    tracing::info!(source = %source.describe(), object, "loading country data");

    let mut bytes = source.fetch()?;
    tracing::debug!(bytes = bytes.len(), "topology downloaded");

    let topology = topology::parse(&mut bytes)?;
    let collection = topology.feature_collection(object)?;

    let mut seen = HashSet::new();
    let countries: Vec<CountryFeature> = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(position, feature)| {
            let mut country = CountryFeature::from_feature(position, feature);
            // Selection is keyed by id, so a repeated id falls back to the position
            if !seen.insert(country.id.clone()) {
                let fallback = CountryId::positional(position);
                tracing::warn!(id = %country.id, %fallback, "duplicate country id");
                country.id = fallback;
                seen.insert(country.id.clone());
            }
            country
        })
        .collect();

    tracing::info!(
        countries = countries.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "country data loaded"
    );
    Ok(countries)
}

/// Run exactly one load on a background thread.
///
/// The receiver yields a single result. If it is dropped before the load
/// finishes, the result is discarded.
pub fn spawn_load<S>(source: S, object: String) -> Receiver<LoadResult>
where
    S: TopologySource + Send + 'static,
{
    let (tx, rx) = bounded(1);
    let fallback = tx.clone();

    let spawned = thread::Builder::new()
        .name("topology-loader".into())
        .spawn(move || {
            let result = load_countries(&source, &object);
            if let Err(e) = &result {
                tracing::error!(error = %e, "failed to fetch country data");
            }
            if tx.send(result).is_err() {
                tracing::debug!("load finished after the receiver was dropped");
            }
        });

    if let Err(e) = spawned {
        let _ = fallback.send(Err(LoadError::Network(format!(
            "failed to start loader thread: {e}"
        ))));
    }

    rx
}
