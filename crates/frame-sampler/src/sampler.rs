//! Frame Sampler Implementation

use crate::{SamplerConfig, SamplerError, StressContext};
use camera_capture::{CameraError, FrameSource};
use emotion::{Classification, ExpressionClassifier};
use metrics::{counter, gauge};
use serde::Serialize;
use std::sync::Arc;
use stress_engine::score_or_neutral;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// What happened over one sampling run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SamplerReport {
    /// Ticks that fired
    pub ticks: u64,
    /// Scored samples committed to the session
    pub samples: u64,
    /// Ticks where nobody was in frame
    pub no_face: u64,
    /// Ticks lost to classifier errors
    pub classifier_failures: u64,
    /// Ticks lost because the frame could not be grabbed
    pub frame_errors: u64,
    /// Classifications that outlasted the tick interval
    pub overruns: u64,
}

/// Frame sampler wiring a classifier to a stress session
pub struct FrameSampler {
    config: SamplerConfig,
    classifier: Arc<dyn ExpressionClassifier>,
    context: StressContext,
}

impl FrameSampler {
    /// Create a new sampler
    pub fn new(
        config: SamplerConfig,
        classifier: Arc<dyn ExpressionClassifier>,
        context: StressContext,
    ) -> Self {
        info!("Frame sampler created (interval {}ms)", config.interval_ms);
        Self {
            config,
            classifier,
            context,
        }
    }

    /// Start sampling a playing video source.
    ///
    /// The session is reset first. Fails with `DeviceUnavailable` when the
    /// source is not live; nothing is started in that case.
    pub async fn start(&self, source: Arc<dyn FrameSource>) -> Result<SamplerHandle, SamplerError> {
        self.config.validate()?;
        if !source.is_live() {
            warn!("Video source not live, sampler not started");
            return Err(CameraError::DeviceUnavailable("video source is not playing".to_string()).into());
        }

        self.context.reset().await;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = Worker {
            config: self.config.clone(),
            classifier: Arc::clone(&self.classifier),
            context: self.context.clone(),
            source: Arc::clone(&source),
        };
        let task = tokio::spawn(worker.run(shutdown_rx));

        info!("Frame sampler started");
        Ok(SamplerHandle {
            shutdown: shutdown_tx,
            task: Some(task),
            source,
            context: self.context.clone(),
        })
    }

    /// Read handle on the session this sampler feeds
    pub fn context(&self) -> &StressContext {
        &self.context
    }
}

/// Running sampler. Dropping it without [`SamplerHandle::stop`] still
/// signals the loop to exit, but does not wait for it.
pub struct SamplerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<SamplerReport>>,
    source: Arc<dyn FrameSource>,
    context: StressContext,
}

impl SamplerHandle {
    /// Stop sampling.
    ///
    /// When this returns the loop has exited, no classification is
    /// outstanding, the video source is released and the session is reset.
    pub async fn stop(mut self) -> Result<SamplerReport, SamplerError> {
        let _ = self.shutdown.send(true);

        let report = match self.task.take() {
            Some(task) => task.await.map_err(|e| SamplerError::Task(e.to_string()))?,
            None => SamplerReport::default(),
        };

        self.source.release();
        self.context.reset().await;

        info!(
            "Frame sampler stopped: {} ticks, {} samples, {} without face, {} failures",
            report.ticks, report.samples, report.no_face, report.classifier_failures
        );
        Ok(report)
    }

    /// Whether the sampling loop is still alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

struct Worker {
    config: SamplerConfig,
    classifier: Arc<dyn ExpressionClassifier>,
    context: StressContext,
    source: Arc<dyn FrameSource>,
}

impl Worker {
    async fn run(self, mut shutdown: watch::Receiver<bool>) -> SamplerReport {
        let period = self.config.interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut report = SamplerReport::default();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }
            report.ticks += 1;
            counter!("sampler_ticks_total").increment(1);

            let frame = match self.source.current_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Frame grab failed: {}", e);
                    report.frame_errors += 1;
                    continue;
                }
            };

            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    debug!("Discarding in-flight classification of frame {}", frame.sequence);
                    break;
                }
                outcome = self.classifier.classify(&frame) => outcome,
            };

            if started.elapsed() > period {
                // The tick that came due meanwhile is dropped, not fired late
                ticker.reset();
                report.overruns += 1;
                counter!("sampler_overruns_total").increment(1);
                debug!("Classification of frame {} overran the interval", frame.sequence);
            }

            match outcome {
                Ok(Classification::Face(vector)) if !vector.is_empty() => {
                    let stopping = *shutdown.borrow();
                    if stopping {
                        break;
                    }

                    let sample = score_or_neutral(&vector);
                    gauge!("stress_score_current").set(f64::from(sample.stress_score));
                    counter!("sampler_samples_total").increment(1);
                    self.context.record(&sample).await;
                    report.samples += 1;
                }
                Ok(_) => {
                    report.no_face += 1;
                    counter!("sampler_no_face_total").increment(1);
                    debug!("No face in frame {}, skipping tick", frame.sequence);
                }
                Err(e) => {
                    report.classifier_failures += 1;
                    counter!("sampler_classifier_failures_total").increment(1);
                    warn!("Classifier failed on frame {}: {}", frame.sequence, e);
                }
            }
        }

        report
    }
}
