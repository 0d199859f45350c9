/// Which cue to play for a touch: the target zone or any other zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    Target,
    NonTarget,
}

/// Audio/visual feedback boundary. Playback itself lives outside the core;
/// deployments plug their player in here.
pub trait FeedbackSink: Send + Sync {
    fn play(&mut self, cue: CueKind);
}

/// Default sink for headless runs.
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn play(&mut self, cue: CueKind) {
        tracing::info!("Feedback cue: {:?}", cue);
    }
}
