//! The dispatch cycle and its serialized consumer loop.

use relayci_core::config::ClientConfig;
use relayci_core::event::EventRecord;
use relayci_core::run::RunRecord;
use relayci_exec::backend::ExecutionBackend;
use relayci_exec::poller::{wait_for_completion, WaitError};
use relayci_hooks::bundle::{BundleError, IntegrationHookBundle};
use relayci_hooks::registry::HookRegistry;
use relayci_render::renderer::Renderer;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cycle::{CycleFailure, CycleReport};
use crate::error::PipelineError;

/// Capacity of the bounded event queue between the listener and the
/// dispatch loop. Deliveries beyond this while a cycle is running are
/// refused at the listener.
pub const EVENT_QUEUE_CAPACITY: usize = 10;

/// Build the bounded queue connecting the event source to [`Dispatcher::serve`].
pub fn event_queue() -> (mpsc::Sender<EventRecord>, mpsc::Receiver<EventRecord>) {
    mpsc::channel(EVENT_QUEUE_CAPACITY)
}

/// A template that made it through rendering and is ready to submit.
struct PreparedJob {
    template: String,
    job_name: String,
    descriptor: String,
}

/// Runs dispatch cycles, one event at a time.
pub struct Dispatcher<B: ExecutionBackend> {
    registry: Arc<HookRegistry>,
    backend: B,
    renderer: Renderer,
    config: ClientConfig,
}

impl<B: ExecutionBackend> Dispatcher<B> {
    pub fn new(registry: Arc<HookRegistry>, backend: B, config: ClientConfig) -> Self {
        let renderer = Renderer::new(config.format, config.checkout_label.clone());
        Self {
            registry,
            backend,
            renderer,
            config,
        }
    }

    /// The execution backend this dispatcher submits to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Drain the event queue, running one full cycle per event. Returns
    /// when the queue closes or `cancel` fires.
    pub async fn serve(&self, mut events: mpsc::Receiver<EventRecord>, cancel: CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("dispatch loop shutting down");
                    return;
                }
                received = events.recv() => match received {
                    Some(event) => event,
                    None => {
                        tracing::info!("event queue closed, dispatch loop exiting");
                        return;
                    }
                },
            };

            tracing::info!(
                commit = %event.head_commit,
                repo = %event.repo_url,
                ref_name = %event.ref_name,
                "dispatch cycle starting"
            );
            match self.run_cycle(&event, &cancel).await {
                Ok(report) => {
                    for failure in &report.failures {
                        tracing::warn!(error = %failure, "cycle completed with failure");
                    }
                    tracing::info!(
                        jobs = report.records.len(),
                        failures = report.failures.len(),
                        all_submitted = report.all_submitted(),
                        "dispatch cycle finished"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "dispatch cycle aborted");
                }
            }
        }
    }

    /// Run one full dispatch cycle for `event`.
    ///
    /// Phase order: pre-hooks (fail-fast), integration `before_job`,
    /// per-template render + submit, optional completion wait,
    /// post-hooks, integration `after_job`.
    pub async fn run_cycle(
        &self,
        event: &EventRecord,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, PipelineError> {
        let mut report = CycleReport::default();

        self.run_pre_hooks(event, cancel).await?;

        let mut integrations = self.setup_integrations(&mut report);

        let prepared = self.prepare_jobs(event, &mut report).await;
        let job_names: Vec<String> = prepared.iter().map(|p| p.job_name.clone()).collect();
        for bundle in &mut integrations {
            if let Err(source) = bundle.hook.before_job(cancel, event, &job_names).await {
                tracing::warn!(hook = %bundle.name, error = %source, "integration before_job failed");
                report.failures.push(CycleFailure::Integration {
                    name: bundle.name.clone(),
                    phase: "before_job",
                    source,
                });
            }
        }

        self.submit_jobs(prepared, event, &mut report).await;

        if self.config.wait {
            self.await_completions(cancel, &mut report).await?;
        }

        self.run_post_hooks(event, cancel, &mut report).await?;

        for bundle in &mut integrations {
            if let Err(source) = bundle.hook.after_job(cancel, &report.records).await {
                tracing::warn!(hook = %bundle.name, error = %source, "integration after_job failed");
                report.failures.push(CycleFailure::Integration {
                    name: bundle.name.clone(),
                    phase: "after_job",
                    source,
                });
            }
        }

        Ok(report)
    }

    /// Run pre-hooks in configured order; the first failure aborts the
    /// cycle before any job can start.
    async fn run_pre_hooks(
        &self,
        event: &EventRecord,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        for descriptor in &self.config.pre_hooks {
            let mut bundle = self.registry.pre_bundle(descriptor)?;
            match bundle.hook.run(cancel, &bundle.params, event).await {
                Ok(result) => {
                    tracing::debug!(hook = %bundle.name, ?result, "pre-hook finished");
                }
                Err(source) => {
                    return Err(PipelineError::PreHook {
                        name: bundle.name,
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolve and set up integration hooks. A failure here skips the
    /// hook for this cycle but never aborts it.
    fn setup_integrations(&self, report: &mut CycleReport) -> Vec<IntegrationHookBundle> {
        let mut bundles = Vec::new();
        for descriptor in &self.config.integration_hooks {
            match self.registry.integration_bundle(descriptor) {
                Ok(bundle) => bundles.push(bundle),
                Err(BundleError::Parameters { name, source }) => {
                    tracing::warn!(hook = %name, error = %source, "integration hook setup failed");
                    report.failures.push(CycleFailure::Integration {
                        name,
                        phase: "setup",
                        source,
                    });
                }
                Err(BundleError::Registry(e)) => {
                    tracing::warn!(hook = %descriptor.name, error = %e, "integration hook unknown");
                    report.failures.push(CycleFailure::Integration {
                        name: descriptor.name.clone(),
                        phase: "setup",
                        source: relayci_hooks::params::HookError::Execution(e.to_string()),
                    });
                }
            }
        }
        bundles
    }

    /// Read and render every configured template. Failures are
    /// contained per template.
    async fn prepare_jobs(&self, event: &EventRecord, report: &mut CycleReport) -> Vec<PreparedJob> {
        let mut prepared = Vec::new();
        for template in &self.config.job_templates {
            let path = self.config.template_dir.join(template);
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(source) => {
                    tracing::warn!(template = %template, error = %source, "template read failed");
                    report.failures.push(CycleFailure::TemplateRead {
                        template: template.clone(),
                        source,
                    });
                    continue;
                }
            };
            let job_name = match self.renderer.job_name(&bytes, event) {
                Ok(name) => name,
                Err(source) => {
                    tracing::warn!(template = %template, error = %source, "job name extraction failed");
                    report.failures.push(CycleFailure::Render {
                        template: template.clone(),
                        source,
                    });
                    continue;
                }
            };
            let descriptor = match self.renderer.render(&bytes, event) {
                Ok(descriptor) => descriptor,
                Err(source) => {
                    tracing::warn!(template = %template, error = %source, "render failed");
                    report.failures.push(CycleFailure::Render {
                        template: template.clone(),
                        source,
                    });
                    continue;
                }
            };
            prepared.push(PreparedJob {
                template: template.clone(),
                job_name,
                descriptor,
            });
        }
        prepared
    }

    /// Submit each prepared descriptor. A transport error or the job-ID
    /// 0 rejection sentinel fails that template only.
    async fn submit_jobs(
        &self,
        prepared: Vec<PreparedJob>,
        event: &EventRecord,
        report: &mut CycleReport,
    ) {
        for job in prepared {
            let job_id = match self
                .backend
                .start_job(&self.config.requestor, &job.descriptor)
                .await
            {
                Ok(id) => id,
                Err(source) => {
                    tracing::warn!(template = %job.template, error = %source, "submission failed");
                    report.failures.push(CycleFailure::Submission {
                        template: job.template,
                        source,
                    });
                    continue;
                }
            };
            if job_id == 0 {
                tracing::warn!(template = %job.template, "execution server rejected submission");
                report.failures.push(CycleFailure::SubmissionRejected {
                    template: job.template,
                });
                continue;
            }
            tracing::info!(template = %job.template, job_name = %job.job_name, job_id, "job submitted");
            report.records.push(RunRecord {
                job_id,
                job_name: job.job_name,
                template: job.template,
                commit_sha: event.head_commit.clone(),
                status: None,
            });
        }
    }

    /// Wait-mode phase: poll every submitted job to a terminal state.
    /// A poll error leaves that record without a status; cancellation
    /// aborts the cycle.
    async fn await_completions(
        &self,
        cancel: &CancellationToken,
        report: &mut CycleReport,
    ) -> Result<(), PipelineError> {
        let interval = self.config.poll_interval();
        for record in &mut report.records {
            match wait_for_completion(
                &self.backend,
                &self.config.requestor,
                record.job_id,
                interval,
                cancel,
            )
            .await
            {
                Ok(status) => record.status = Some(status),
                Err(WaitError::Cancelled) => return Err(PipelineError::Cancelled),
                Err(source) => {
                    tracing::warn!(job_id = record.job_id, error = %source, "completion wait failed");
                    report.failures.push(CycleFailure::Wait {
                        job_id: record.job_id,
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Run post-hooks in configured order over the cycle's records. In
    /// wait mode, records that never reached a terminal state are
    /// withheld from post-hooks.
    async fn run_post_hooks(
        &self,
        event: &EventRecord,
        cancel: &CancellationToken,
        report: &mut CycleReport,
    ) -> Result<(), PipelineError> {
        let records: Vec<RunRecord> = if self.config.wait {
            report
                .records
                .iter()
                .filter(|r| r.status.is_some())
                .cloned()
                .collect()
        } else {
            report.records.clone()
        };

        for descriptor in &self.config.post_hooks {
            let mut bundle = match self.registry.post_bundle(descriptor) {
                Ok(bundle) => bundle,
                Err(BundleError::Parameters { name, source }) => {
                    tracing::warn!(hook = %name, error = %source, "post-hook parameters rejected");
                    report
                        .failures
                        .push(CycleFailure::PostHook { name, source });
                    continue;
                }
                Err(e @ BundleError::Registry(_)) => return Err(e.into()),
            };
            match bundle.hook.run(cancel, &bundle.params, event, &records).await {
                Ok(result) => {
                    tracing::debug!(hook = %bundle.name, ?result, "post-hook finished");
                }
                Err(source) => {
                    tracing::warn!(hook = %bundle.name, error = %source, "post-hook failed");
                    report.failures.push(CycleFailure::PostHook {
                        name: bundle.name,
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}
