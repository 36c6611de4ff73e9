use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("weather_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("weather_chat.client.request_errors");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("weather_chat.stream.events");
pub(crate) static STREAM_IGNORED_EVENTS: Counter =
    Counter::new("weather_chat.stream.ignored_events");
pub(crate) static STREAM_DELTAS: Counter = Counter::new("weather_chat.stream.deltas");
pub(crate) static STREAM_BYTES: Counter = Counter::new("weather_chat.stream.bytes");
pub(crate) static STREAM_TTFD: Moments = Moments::new("weather_chat.stream.ttfd_seconds");
pub(crate) static STREAM_DURATION: Moments =
    Moments::new("weather_chat.stream.duration_seconds");

pub(crate) static TURNS_STARTED: Counter = Counter::new("weather_chat.conversation.turns");
pub(crate) static TURNS_FAILED: Counter = Counter::new("weather_chat.conversation.turn_failures");
pub(crate) static TURNS_SKIPPED: Counter = Counter::new("weather_chat.conversation.turns_skipped");
pub(crate) static TURN_DURATION: Moments =
    Moments::new("weather_chat.conversation.turn_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_IGNORED_EVENTS);
    collector.register_counter(&STREAM_DELTAS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_TTFD);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&TURNS_STARTED);
    collector.register_counter(&TURNS_FAILED);
    collector.register_counter(&TURNS_SKIPPED);
    collector.register_moments(&TURN_DURATION);
}
