// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background job runner.
//
// Each print, scan, or copy request runs on its own tokio task and reports
// back through an unbounded channel: zero or more `Progress` events, then
// exactly one `Completed`. Dropping the handle discards later events but
// does not cancel the job.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use easyprinter_core::error::Result;
use easyprinter_core::human_errors::humanize_error;
use easyprinter_core::settings::{PrintSettings, ScanSettings};
use easyprinter_core::types::{JobId, JobResult};

use crate::dispatcher::{JobDispatcher, ProgressReporter};

/// Event emitted by a running job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Progress { message: String, percent: u8 },
    Completed(JobResult),
}

/// Caller's end of a spawned job.
#[derive(Debug)]
pub struct JobHandle {
    pub id: JobId,
    pub events: mpsc::UnboundedReceiver<JobEvent>,
}

impl JobHandle {
    /// Drain progress events and return the final result.
    pub async fn wait(mut self) -> JobResult {
        while let Some(event) = self.events.recv().await {
            if let JobEvent::Completed(result) = event {
                return result;
            }
        }
        JobResult::failed(self.id, "Задание прервано")
    }
}

/// Forwards dispatcher progress onto the job's event channel.
struct ChannelProgress(mpsc::UnboundedSender<JobEvent>);

impl ProgressReporter for ChannelProgress {
    fn report(&self, message: &str, percent: u8) {
        // Receiver gone means nobody is listening any more.
        let _ = self.0.send(JobEvent::Progress {
            message: message.to_string(),
            percent,
        });
    }
}

/// Spawns dispatcher operations as background jobs.
#[derive(Clone)]
pub struct WorkerRunner {
    dispatcher: Arc<JobDispatcher>,
}

impl WorkerRunner {
    pub fn new(dispatcher: Arc<JobDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn spawn_print(&self, path: PathBuf, settings: PrintSettings) -> JobHandle {
        self.spawn("print", move |dispatcher, progress| async move {
            dispatcher.print_file(&path, &settings, &progress).await?;
            Ok(None)
        })
    }

    /// Scan and save; the saved file is the job's artifact.
    pub fn spawn_scan(&self, settings: ScanSettings) -> JobHandle {
        self.spawn("scan", move |dispatcher, progress| async move {
            let image = dispatcher.scan_to_image(&settings, &progress).await?;
            let path = dispatcher.save_scanned_image(image, &settings).await?;
            Ok(Some(path))
        })
    }

    pub fn spawn_copy(
        &self,
        scan_settings: ScanSettings,
        print_settings: PrintSettings,
        copies: u32,
    ) -> JobHandle {
        self.spawn("copy", move |dispatcher, progress| async move {
            dispatcher
                .copy(&scan_settings, &print_settings, copies, &progress)
                .await?;
            Ok(None)
        })
    }

    fn spawn<F, Fut>(&self, kind: &'static str, job: F) -> JobHandle
    where
        F: FnOnce(Arc<JobDispatcher>, ChannelProgress) -> Fut,
        Fut: Future<Output = Result<Option<PathBuf>>> + Send + 'static,
    {
        let id = JobId::new();
        let (tx, events) = mpsc::unbounded_channel();
        let work = tokio::spawn(job(
            Arc::clone(&self.dispatcher),
            ChannelProgress(tx.clone()),
        ));

        // The supervising task outlives a panicking job, so the caller
        // always gets its `Completed`.
        tokio::spawn(async move {
            let result = match work.await {
                Ok(Ok(artifact)) => {
                    info!(job = %id, kind, "job completed");
                    JobResult::succeeded(id, artifact)
                }
                Ok(Err(e)) => {
                    error!(job = %id, kind, error = %e, "job failed");
                    JobResult::failed(id, humanize_error(&e).to_string())
                }
                Err(join_err) => {
                    error!(job = %id, kind, error = %join_err, "job aborted");
                    JobResult::failed(id, "Внутренняя ошибка. Попробуйте ещё раз.")
                }
            };
            let _ = tx.send(JobEvent::Completed(result));
        });

        JobHandle { id, events }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use easyprinter_core::config::DeviceConfig;
    use easyprinter_core::settings::ScanFormat;
    use easyprinter_document::DefaultAdjuster;
    use image::{DynamicImage, ImageFormat, RgbImage};

    use super::*;
    use crate::discovery::DeviceDiscovery;
    use crate::testing::FakeBackend;

    fn runner(backend: Arc<FakeBackend>, temp_dir: &Path) -> WorkerRunner {
        let discovery = DeviceDiscovery::new(backend.clone(), &DeviceConfig::default());
        let dispatcher = JobDispatcher::new(
            backend,
            discovery,
            Arc::new(DefaultAdjuster),
            temp_dir.to_path_buf(),
        );
        WorkerRunner::new(Arc::new(dispatcher))
    }

    async fn collect(mut handle: JobHandle) -> Vec<JobEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.events.recv().await {
            events.push(event);
        }
        events
    }

    fn completions(events: &[JobEvent]) -> Vec<&JobResult> {
        events
            .iter()
            .filter_map(|event| match event {
                JobEvent::Completed(result) => Some(result),
                JobEvent::Progress { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn successful_print_ends_with_one_completion() {
        let temp = tempfile::tempdir().expect("tempdir");
        let doc = temp.path().join("letter.pdf");
        std::fs::write(&doc, b"%PDF-1.4\n").expect("write");
        let backend = Arc::new(FakeBackend::with_printer("HP LaserJet", "idle"));

        let handle = runner(backend, temp.path()).spawn_print(doc, PrintSettings::default());
        let id = handle.id;
        let events = collect(handle).await;

        let done = completions(&events);
        assert_eq!(done.len(), 1);
        assert!(done[0].success);
        assert_eq!(done[0].job_id, id);
        assert!(matches!(events.last(), Some(JobEvent::Completed(_))));

        let percents: Vec<u8> = events
            .iter()
            .filter_map(|event| match event {
                JobEvent::Progress { percent, .. } => Some(*percent),
                JobEvent::Completed(_) => None,
            })
            .collect();
        assert_eq!(percents, vec![10, 50, 80, 100]);
    }

    #[tokio::test]
    async fn failed_print_reports_humanized_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let handle = runner(Arc::new(FakeBackend::default()), temp.path())
            .spawn_print(temp.path().join("letter.pdf"), PrintSettings::default());

        let events = collect(handle).await;
        let done = completions(&events);
        assert_eq!(done.len(), 1);
        assert!(!done[0].success);
        let message = done[0].error_message.as_deref().expect("error message");
        assert!(message.starts_with("Принтер не найден."), "{message}");
    }

    #[tokio::test]
    async fn panicking_job_still_completes_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let doc = temp.path().join("letter.pdf");
        std::fs::write(&doc, b"%PDF-1.4\n").expect("write");
        let backend = Arc::new(FakeBackend {
            print_panics: true,
            ..FakeBackend::with_printer("HP LaserJet", "idle")
        });

        let result = runner(backend, temp.path())
            .spawn_print(doc, PrintSettings::default())
            .wait()
            .await;
        assert!(!result.success);
        assert!(result.error_message.is_some());
    }

    #[tokio::test]
    async fn scan_job_returns_saved_artifact() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut png = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(6, 4))
            .write_to(&mut png, ImageFormat::Png)
            .expect("encode");
        let backend = Arc::new(FakeBackend {
            scan_bytes: Some(png.into_inner()),
            ..FakeBackend::default()
        });
        let settings = ScanSettings {
            format: ScanFormat::Png,
            output_folder: temp.path().to_path_buf(),
            file_name: "page".into(),
            ..ScanSettings::default()
        };

        let result = runner(backend, temp.path()).spawn_scan(settings).wait().await;
        assert!(result.success, "{:?}", result.error_message);
        let artifact = result.artifact_path.expect("artifact");
        assert_eq!(artifact, temp.path().join("page.png"));
        assert!(artifact.exists());
    }

    #[tokio::test]
    async fn copy_job_prints_requested_copies() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut png = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(6, 4))
            .write_to(&mut png, ImageFormat::Png)
            .expect("encode");
        let backend = Arc::new(FakeBackend {
            scan_bytes: Some(png.into_inner()),
            ..FakeBackend::with_printer("HP LaserJet", "idle")
        });

        let result = runner(backend.clone(), temp.path())
            .spawn_copy(ScanSettings::default(), PrintSettings::default(), 2)
            .wait()
            .await;
        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(backend.print_calls()[0].copies, 2);
    }
}
