//! Search pipeline: geocode, fetch pollution, classify
//!
//! [`AirQualityPipeline::lookup`] is the core boundary and returns a typed
//! error. [`AirQualityPipeline::search`] drives a caller-owned [`QueryState`]
//! through Idle, Searching, Success and Failed.

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::location_resolver::GeoResolver;
use crate::models::{AirQualityReport, AqiValue, PollutantReading};
use crate::pollution::PollutionFetcher;
use crate::{AirQualityError, Result};

pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    Idle,
    Searching,
    Success,
    Failed,
}

/// UI-facing state of one session.
///
/// Reading and AQI are only ever stored together inside the report.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct QueryState {
    city_input: String,
    report: Option<AirQualityReport>,
    in_flight: bool,
    last_error: Option<String>,
}

impl QueryState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> SearchPhase {
        if self.in_flight {
            SearchPhase::Searching
        } else if self.last_error.is_some() {
            SearchPhase::Failed
        } else if self.report.is_some() {
            SearchPhase::Success
        } else {
            SearchPhase::Idle
        }
    }

    #[must_use]
    pub fn city_input(&self) -> &str {
        &self.city_input
    }

    #[must_use]
    pub fn report(&self) -> Option<&AirQualityReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn last_reading(&self) -> Option<&PollutantReading> {
        self.report.as_ref().map(|report| &report.reading)
    }

    #[must_use]
    pub fn last_aqi(&self) -> Option<AqiValue> {
        self.report.as_ref().map(|report| report.aqi)
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Enter Searching from any phase
    pub fn start_search(&mut self, city: &str) {
        city.clone_into(&mut self.city_input);
        self.last_error = None;
        self.in_flight = true;
    }

    /// Searching -> Success
    pub fn succeed(&mut self, report: AirQualityReport) {
        self.report = Some(report);
        self.last_error = None;
        self.in_flight = false;
    }

    /// Searching -> Failed; the previous report is dropped
    pub fn fail(&mut self, message: String) {
        self.report = None;
        self.last_error = Some(message);
        self.in_flight = false;
    }
}

/// Sequences the two network stages and classification
pub struct AirQualityPipeline<G, P> {
    geo: G,
    pollution: P,
    stage_timeout: Duration,
}

impl<G: GeoResolver, P: PollutionFetcher> AirQualityPipeline<G, P> {
    pub fn new(geo: G, pollution: P) -> Self {
        Self {
            geo,
            pollution,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    /// Bound each network stage; expiry is a transport error
    #[must_use]
    pub fn with_stage_timeout(mut self, stage_timeout: Duration) -> Self {
        self.stage_timeout = stage_timeout;
        self
    }

    #[must_use]
    pub fn stage_timeout(&self) -> Duration {
        self.stage_timeout
    }

    /// Resolve `city`, fetch its current pollution and classify it
    #[instrument(skip(self))]
    pub async fn lookup(&self, city: &str) -> Result<AirQualityReport> {
        let coordinates = self
            .bounded("geocoding", self.geo.resolve(city))
            .await?;
        let sample = self
            .bounded("air pollution", self.pollution.fetch_pollution(coordinates))
            .await?;

        let report = AirQualityReport::new(city.to_string(), coordinates, sample);
        info!(
            "Air quality for '{}': AQI {} ({})",
            city, report.aqi, report.category.level
        );
        Ok(report)
    }

    /// Run one search against `state`.
    ///
    /// Every failure is reduced to its user-facing message.
    pub async fn search(&self, state: &mut QueryState, city: &str) {
        state.start_search(city);

        match self.lookup(city).await {
            Ok(report) => state.succeed(report),
            Err(err) => {
                warn!("Search for '{}' failed: {}", city, err);
                state.fail(err.user_message());
            }
        }
    }

    async fn bounded<T>(&self, stage: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.stage_timeout, call)
            .await
            .map_err(|_| {
                AirQualityError::transport(format!(
                    "Timed out after {:?} waiting for {stage} data",
                    self.stage_timeout
                ))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AqiLevel, Coordinates, PollutionSample, SeverityTag};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGeo {
        matches: Vec<Coordinates>,
        calls: AtomicUsize,
    }

    impl FakeGeo {
        fn returning(matches: Vec<Coordinates>) -> Self {
            Self {
                matches,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GeoResolver for FakeGeo {
        async fn resolve(&self, city: &str) -> Result<Coordinates> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.matches
                .first()
                .copied()
                .ok_or_else(|| AirQualityError::not_found(city))
        }
    }

    /// Plays back queued outcomes, then repeats the last one
    struct FakePollution {
        outcomes: Mutex<Vec<std::result::Result<PollutionSample, String>>>,
        seen: Mutex<Vec<Coordinates>>,
    }

    impl FakePollution {
        fn returning(outcomes: Vec<std::result::Result<PollutionSample, String>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PollutionFetcher for FakePollution {
        async fn fetch_pollution(&self, coords: Coordinates) -> Result<PollutionSample> {
            self.seen.lock().unwrap().push(coords);
            let mut outcomes = self.outcomes.lock().unwrap();
            let outcome = if outcomes.len() > 1 {
                outcomes.remove(0)
            } else {
                outcomes[0].clone()
            };
            outcome.map_err(AirQualityError::transport)
        }
    }

    struct StalledPollution;

    #[async_trait]
    impl PollutionFetcher for StalledPollution {
        async fn fetch_pollution(&self, _coords: Coordinates) -> Result<PollutionSample> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(AirQualityError::transport("unreachable"))
        }
    }

    fn london() -> Coordinates {
        Coordinates::new(51.5074, -0.1278)
    }

    fn london_sample() -> PollutionSample {
        PollutionSample {
            aqi: AqiValue(2),
            components: PollutantReading {
                pm2_5: 8.3,
                pm10: 12.1,
                co: 230.1,
                no2: 15.4,
                o3: 55.2,
            },
            observed_at: None,
        }
    }

    #[test]
    fn test_new_state_is_idle() {
        let state = QueryState::new();
        assert_eq!(state.phase(), SearchPhase::Idle);
        assert!(state.last_reading().is_none());
        assert!(state.last_aqi().is_none());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_start_search_clears_error_and_keeps_report() {
        let mut state = QueryState::new();
        state.succeed(AirQualityReport::new("London".into(), london(), london_sample()));
        state.start_search("Paris");
        assert_eq!(state.phase(), SearchPhase::Searching);
        assert!(state.report().is_some());

        state.fail("City not found: Paris".into());
        state.start_search("Paris");
        assert!(state.last_error().is_none());
        assert!(state.is_in_flight());
        assert_eq!(state.city_input(), "Paris");
    }

    #[tokio::test]
    async fn test_london_end_to_end() {
        let pollution = FakePollution::returning(vec![Ok(london_sample())]);
        let pipeline = AirQualityPipeline::new(FakeGeo::returning(vec![london()]), pollution);
        let mut state = QueryState::new();

        pipeline.search(&mut state, "London").await;

        assert_eq!(state.phase(), SearchPhase::Success);
        let report = state.report().unwrap();
        assert_eq!(report.category.level, AqiLevel::Fair);
        assert_eq!(report.category.description, "Air quality is moderate");
        assert_eq!(report.category.severity, SeverityTag::Yellow);
        assert_eq!(state.last_reading(), Some(&london_sample().components));
        assert_eq!(state.last_aqi(), Some(AqiValue(2)));
        assert_eq!(*pipeline.pollution.seen.lock().unwrap(), vec![london()]);
    }

    #[tokio::test]
    async fn test_unknown_city_fails_without_reading() {
        let pollution = FakePollution::returning(vec![Ok(london_sample())]);
        let pipeline = AirQualityPipeline::new(FakeGeo::returning(vec![]), pollution);
        let mut state = QueryState::new();

        pipeline.search(&mut state, "Nowhereville").await;

        assert_eq!(state.phase(), SearchPhase::Failed);
        assert!(state.last_error().unwrap().contains("not found"));
        assert!(state.last_reading().is_none());
        assert!(pipeline.pollution.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pollution_failure_clears_previous_reading() {
        let pollution = FakePollution::returning(vec![
            Ok(london_sample()),
            Err("Error fetching air pollution data: HTTP 500".to_string()),
        ]);
        let pipeline = AirQualityPipeline::new(FakeGeo::returning(vec![london()]), pollution);
        let mut state = QueryState::new();

        pipeline.search(&mut state, "London").await;
        assert_eq!(state.phase(), SearchPhase::Success);

        pipeline.search(&mut state, "London").await;
        assert_eq!(state.phase(), SearchPhase::Failed);
        assert_eq!(
            state.last_error(),
            Some("Error fetching air pollution data: HTTP 500")
        );
        assert!(state.last_reading().is_none());
        assert!(state.last_aqi().is_none());
    }

    #[tokio::test]
    async fn test_repeated_search_is_idempotent() {
        let pollution = FakePollution::returning(vec![Ok(london_sample())]);
        let pipeline = AirQualityPipeline::new(FakeGeo::returning(vec![london()]), pollution);
        let mut state = QueryState::new();

        pipeline.search(&mut state, "London").await;
        let first = state.clone();
        pipeline.search(&mut state, "London").await;

        assert_eq!(first, state);
        assert_eq!(pipeline.geo.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_returns_typed_error() {
        let pollution = FakePollution::returning(vec![Ok(london_sample())]);
        let pipeline = AirQualityPipeline::new(FakeGeo::returning(vec![]), pollution);

        let result = pipeline.lookup("Nowhereville").await;
        assert!(matches!(result, Err(AirQualityError::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_stage_times_out() {
        let pipeline = AirQualityPipeline::new(FakeGeo::returning(vec![london()]), StalledPollution)
            .with_stage_timeout(Duration::from_secs(5));
        let mut state = QueryState::new();

        pipeline.search(&mut state, "London").await;

        assert_eq!(state.phase(), SearchPhase::Failed);
        assert_eq!(
            state.last_error(),
            Some("Timed out after 5s waiting for air pollution data")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_is_reported_precisely() {
        let pipeline = AirQualityPipeline::new(FakeGeo::returning(vec![london()]), StalledPollution)
            .with_stage_timeout(Duration::from_millis(250));

        let result = pipeline.lookup("London").await;
        match result {
            Err(AirQualityError::Transport { message }) => {
                assert_eq!(message, "Timed out after 250ms waiting for air pollution data");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }
}
