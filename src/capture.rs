use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use crate::common::Frame;
use crate::error::AppError;

/// Camera boundary. `open` failures are fatal to startup; `release` runs on
/// every capture-loop exit path.
pub trait FrameSource: Send {
    fn open(&mut self) -> Result<(), AppError>;
    /// Next frame, blocking. Ok(None) signals end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, AppError>;
    fn release(&mut self);
    fn name(&self) -> &'static str;
}

/// Drives a `FrameSource` on a dedicated thread, feeding the bounded frame
/// channel. Frames are dropped with a warning when the pipeline is behind.
pub struct CaptureClient {
    cancel_token: CancellationToken,
    capture_thread: Option<std::thread::JoinHandle<()>>,
}

impl CaptureClient {
    pub fn start(mut source: Box<dyn FrameSource>, frame_tx: Sender<Frame>) -> Result<Self, AppError> {
        source.open()?;
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();
        Ok(Self {
            cancel_token,
            capture_thread: Some(std::thread::spawn(move || {
                run_capture_loop(source, frame_tx, token)
            })),
        })
    }

    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(thread) = self.capture_thread.take() {
            thread.join().expect("Capture thread panicked");
        }
    }
}

impl Drop for CaptureClient {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_capture_loop(
    mut source: Box<dyn FrameSource>,
    frame_tx: Sender<Frame>,
    cancel_token: CancellationToken,
) {
    tracing::info!("Capture started from {}", source.name());
    while !cancel_token.is_cancelled() {
        match source.next_frame() {
            Ok(Some(frame)) => match frame_tx.try_send(frame) {
                Ok(_) => {}
                Err(TrySendError::Full(_)) => {
                    // Drop frame to keep real-time
                    tracing::warn!("Dropping frame: channel full");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!("Frame channel closed, stopping capture loop");
                    break;
                }
            },
            Ok(None) => {
                tracing::info!("Frame source ended");
                break;
            }
            Err(e) => {
                tracing::error!("Failed to grab frame: {}", e);
                break;
            }
        }
    }
    source.release();
    tracing::info!("Capture stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::DynamicImage;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct CountdownSource {
        remaining: usize,
        released: Arc<AtomicBool>,
    }

    impl FrameSource for CountdownSource {
        fn open(&mut self) -> Result<(), AppError> {
            Ok(())
        }

        fn next_frame(&mut self) -> Result<Option<Frame>, AppError> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(Frame::new(DynamicImage::new_rgb8(8, 8), Utc::now())))
        }

        fn release(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "countdown"
        }
    }

    struct FailingSource;

    impl FrameSource for FailingSource {
        fn open(&mut self) -> Result<(), AppError> {
            Err(AppError::Camera("Failed to open camera".to_string()))
        }

        fn next_frame(&mut self) -> Result<Option<Frame>, AppError> {
            Ok(None)
        }

        fn release(&mut self) {}

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn source_open_failure_is_fatal_at_startup() {
        let (frame_tx, _frame_rx) = mpsc::channel(4);
        assert!(CaptureClient::start(Box::new(FailingSource), frame_tx).is_err());
    }

    #[tokio::test]
    async fn frames_flow_and_source_is_released_at_end_of_stream() {
        let released = Arc::new(AtomicBool::new(false));
        let source = CountdownSource {
            remaining: 3,
            released: released.clone(),
        };
        let (frame_tx, mut frame_rx) = mpsc::channel(8);
        let mut client = CaptureClient::start(Box::new(source), frame_tx).unwrap();

        for _ in 0..3 {
            assert!(frame_rx.recv().await.is_some());
        }
        assert!(frame_rx.recv().await.is_none());

        client.stop();
        assert!(released.load(Ordering::SeqCst));
    }
}
