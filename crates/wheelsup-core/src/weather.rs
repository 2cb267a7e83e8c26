use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use crate::client::WeatherBackend;
use crate::trip::{Airport, WeatherPreview};

/// Idle time after the last context change before a preview lookup fires.
pub const WEATHER_QUIESCENCE: Duration = Duration::from_millis(350);

/// Advisory weather state, owned exclusively by the previewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherPreviewState {
    pub preview: Option<WeatherPreview>,
    pub loading: bool,
}

/// Debounced, cancelable weather-preview lookup, independent of the address
/// field. Same generation discipline as the suggestion fetcher: a response
/// is published only if its generation is still current when it lands.
///
/// The preview is advisory; the authoritative weather delay is recomputed
/// server-side at submission time.
pub struct WeatherPreviewer<B> {
    backend: Arc<B>,
    state: Arc<Mutex<WeatherPreviewState>>,
    generation: Arc<AtomicU64>,
}

impl<B: WeatherBackend + 'static> WeatherPreviewer<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(WeatherPreviewState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> WeatherPreviewState {
        lock(&self.state).clone()
    }

    /// Feeds one change of the airport/date/time context into the pipeline.
    /// If any of the three is absent the preview resets immediately with no
    /// network call.
    pub fn on_context_change(
        &self,
        airport: Option<Airport>,
        arrival_date: &str,
        arrival_time: &str,
    ) -> Option<JoinHandle<()>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let date = arrival_date.trim().to_string();
        let time = arrival_time.trim().to_string();
        let airport = match airport {
            Some(airport) if !date.is_empty() && !time.is_empty() => airport,
            _ => {
                *lock(&self.state) = WeatherPreviewState::default();
                return None;
            }
        };

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let counter = Arc::clone(&self.generation);

        Some(tokio::spawn(async move {
            tokio::time::sleep(WEATHER_QUIESCENCE).await;
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }

            lock(&state).loading = true;

            let outcome = backend.preview_weather(airport, &date, &time).await;

            if counter.load(Ordering::SeqCst) != generation {
                debug!(
                    "discarding stale weather preview — airport={} generation={}",
                    airport, generation
                );
                return;
            }

            let preview = match outcome {
                Ok(preview) => Some(preview),
                Err(e) => {
                    // Advisory degradation: a failed preview never blocks
                    // the user from submitting.
                    debug!("weather preview failed — airport={} error={}", airport, e);
                    None
                }
            };

            debug!(
                "weather preview settled — airport={} arrival={} {} generation={}",
                airport, date, time, generation
            );

            let mut state = lock(&state);
            state.preview = preview;
            state.loading = false;
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
