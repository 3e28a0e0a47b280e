//! Background conversion jobs.
//!
//! A [`ConversionJob`] runs one conversion on its own worker thread and
//! reports back over an `mpsc` channel. The owner never shares mutable state
//! with the worker: it reads [`JobEvent`]s and may flip the job's
//! [`CancellationToken`], nothing else.

use crate::cancel::CancellationToken;
use crate::canvas::Canvas;
use crate::config::ConversionConfig;
use crate::convert::convert_file;
use crate::error::{ErrorKind, Pdf2PptxError};
use crate::output::{ConversionOutcome, ConversionStats};
use crate::progress::ConversionProgressCallback;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error};

/// Messages sent from the worker thread to the job's owner.
#[derive(Debug, Clone)]
pub enum JobEvent {
    Started { total_pages: usize, canvas: Canvas },
    PageStarted { page: usize, total: usize },
    PageDone { page: usize, total: usize, image_bytes: u64 },
    /// Free-form line for the owner's log.
    Log(String),
    /// Always the last event of a job.
    Finished(JobOutcome),
}

/// Final result of a job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed(ConversionStats),
    Cancelled {
        processed_pages: usize,
        total_pages: usize,
    },
    Failed {
        message: String,
        kind: Option<ErrorKind>,
    },
}

impl JobOutcome {
    fn from_result(result: Result<ConversionOutcome, Pdf2PptxError>) -> Self {
        match result {
            Ok(ConversionOutcome::Completed(stats)) => JobOutcome::Completed(stats),
            Ok(ConversionOutcome::Cancelled {
                processed_pages,
                total_pages,
            }) => JobOutcome::Cancelled {
                processed_pages,
                total_pages,
            },
            Err(e) => JobOutcome::Failed {
                message: e.to_string(),
                kind: Some(e.kind()),
            },
        }
    }

    fn worker_lost() -> Self {
        JobOutcome::Failed {
            message: "Conversion worker stopped unexpectedly".into(),
            kind: None,
        }
    }
}

/// Forwards progress events into the job channel.
struct ChannelProgress {
    tx: Sender<JobEvent>,
}

impl ConversionProgressCallback for ChannelProgress {
    fn on_conversion_start(&self, total_pages: usize, canvas: &Canvas) {
        let _ = self.tx.send(JobEvent::Started {
            total_pages,
            canvas: *canvas,
        });
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = self.tx.send(JobEvent::PageStarted {
            page: page_num,
            total: total_pages,
        });
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, image_bytes: u64) {
        let _ = self.tx.send(JobEvent::PageDone {
            page: page_num,
            total: total_pages,
            image_bytes,
        });
    }

    fn on_conversion_complete(&self, _total_pages: usize, output: &Path) {
        let _ = self
            .tx
            .send(JobEvent::Log(format!("Saved {}", output.display())));
    }
}

/// A conversion running on a dedicated worker thread.
pub struct ConversionJob {
    cancel: CancellationToken,
    events: Receiver<JobEvent>,
    handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl ConversionJob {
    /// Convert the PDF at `input` to `output` in the background.
    pub fn spawn(
        input: PathBuf,
        output: PathBuf,
        config: ConversionConfig,
    ) -> Result<Self, Pdf2PptxError> {
        Self::spawn_with(config, move |config, cancel| {
            convert_file(&input, &output, config, cancel)
        })
    }

    /// Run `work` in the background with a progress callback that feeds this job's channel.
    ///
    /// Any callback already set on `config` is replaced.
    pub fn spawn_with<F>(config: ConversionConfig, work: F) -> Result<Self, Pdf2PptxError>
    where
        F: FnOnce(&ConversionConfig, &CancellationToken) -> Result<ConversionOutcome, Pdf2PptxError>
            + Send
            + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let cancel = CancellationToken::new();

        let mut config = config;
        config.progress_callback = Some(Arc::new(ChannelProgress { tx: tx.clone() }));

        let worker_cancel = cancel.clone();
        let handle = std::thread::Builder::new()
            .name("pdf2pptx-worker".into())
            .spawn(move || {
                let result = work(&config, &worker_cancel);
                if let Err(ref e) = result {
                    error!("Conversion failed: {}", e);
                }
                let _ = tx.send(JobEvent::Finished(JobOutcome::from_result(result)));
            })
            .map_err(|e| Pdf2PptxError::Internal(format!("Failed to start worker: {}", e)))?;

        debug!("Conversion worker started");
        Ok(Self {
            cancel,
            events: rx,
            handle: Some(handle),
            finished: false,
        })
    }

    /// Ask the worker to stop before its next page.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether [`JobEvent::Finished`] has been delivered.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take every event that is ready without blocking.
    ///
    /// A worker that dies without reporting yields a synthetic
    /// [`JobOutcome::Failed`].
    pub fn drain(&mut self) -> Vec<JobEvent> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    let last = matches!(event, JobEvent::Finished(_));
                    out.push(event);
                    if last {
                        self.finished = true;
                        self.join();
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    self.join();
                    out.push(JobEvent::Finished(JobOutcome::worker_lost()));
                    break;
                }
            }
        }
        out
    }

    /// Block until the worker finishes and return its outcome.
    pub fn wait(mut self) -> JobOutcome {
        if self.finished {
            return JobOutcome::worker_lost();
        }
        let outcome = loop {
            match self.events.recv() {
                Ok(JobEvent::Finished(outcome)) => break outcome,
                Ok(_) => continue,
                Err(_) => break JobOutcome::worker_lost(),
            }
        };
        self.finished = true;
        self.join();
        outcome
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Conversion worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PageSize;
    use std::time::{Duration, Instant};

    fn drain_until_finished(job: &mut ConversionJob) -> Vec<JobEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while !job.is_finished() {
            assert!(Instant::now() < deadline, "job did not finish");
            events.extend(job.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        events
    }

    #[test]
    fn progress_events_arrive_before_finished() {
        let mut job = ConversionJob::spawn_with(ConversionConfig::default(), |config, _cancel| {
            let cb = config.progress_callback.as_ref().unwrap();
            let canvas = Canvas::from_first_page(10.0, PageSize::new(612.0, 792.0))?;
            cb.on_conversion_start(2, &canvas);
            cb.on_page_start(1, 2);
            cb.on_page_complete(1, 2, 10);
            Ok(ConversionOutcome::Cancelled {
                processed_pages: 1,
                total_pages: 2,
            })
        })
        .unwrap();

        let events = drain_until_finished(&mut job);
        assert!(matches!(events[0], JobEvent::Started { total_pages: 2, .. }));
        assert!(matches!(events[1], JobEvent::PageStarted { page: 1, total: 2 }));
        assert!(matches!(events[2], JobEvent::PageDone { page: 1, .. }));
        assert!(matches!(
            events.last(),
            Some(JobEvent::Finished(JobOutcome::Cancelled {
                processed_pages: 1,
                ..
            }))
        ));
        assert!(job.drain().is_empty());
    }

    #[test]
    fn cancel_reaches_worker() {
        let job = ConversionJob::spawn_with(ConversionConfig::default(), |_config, cancel| {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !cancel.is_cancelled() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(ConversionOutcome::Cancelled {
                processed_pages: 0,
                total_pages: 3,
            })
        })
        .unwrap();

        job.cancel();
        assert!(job.is_cancel_requested());
        assert!(matches!(job.wait(), JobOutcome::Cancelled { total_pages: 3, .. }));
    }

    #[test]
    fn errors_become_failed_outcomes() {
        let job = ConversionJob::spawn_with(ConversionConfig::default(), |_, _| {
            Err(Pdf2PptxError::EmptyDocument)
        })
        .unwrap();
        match job.wait() {
            JobOutcome::Failed { message, kind } => {
                assert!(message.contains("no pages"));
                assert_eq!(kind, Some(ErrorKind::InvalidInput));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn panicking_worker_is_reported_as_failure() {
        let mut job = ConversionJob::spawn_with(ConversionConfig::default(), |_, _| {
            panic!("boom");
        })
        .unwrap();
        let events = drain_until_finished(&mut job);
        assert!(matches!(
            events.last(),
            Some(JobEvent::Finished(JobOutcome::Failed { kind: None, .. }))
        ));
    }
}
