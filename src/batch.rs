//! Many images at once.
//!
//! Images share nothing, so each one is its own task. The async runner
//! awaits the classifier under a per-image timeout and hands the CPU-bound
//! refinement to a bounded pool of blocking workers. Aborting one job
//! leaves the others running.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;
use rayon::prelude::*;
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, Id, JoinSet};

use crate::config::RefinementConfig;
use crate::error::{RefineError, Result};
use crate::models::ProbabilityGrid;
use crate::pipeline::{Pipeline, RefinementOutcome};
use crate::segmenter::Segmenter;

/// One image to segment and refine.
pub struct ImageJob {
    pub id: String,
    pub image: RgbImage,
}

impl ImageJob {
    pub fn new(id: impl Into<String>, image: RgbImage) -> Self {
        Self { id: id.into(), image }
    }
}

/// Outcome for one job. `index` is the submission order.
#[derive(Debug)]
pub struct JobReport {
    pub index: usize,
    pub id: String,
    pub result: Result<RefinementOutcome>,
}

pub struct BatchRunner<S> {
    segmenter: Arc<S>,
    pipeline: Arc<Pipeline>,
    timeout: Duration,
    workers: Arc<Semaphore>,
    tasks: JoinSet<JobReport>,
    submitted: HashMap<Id, (usize, String)>,
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

impl<S: Segmenter + 'static> BatchRunner<S> {
    /// Validates `config` up front; an invalid config never reaches a job.
    pub fn new(segmenter: S, config: &RefinementConfig) -> Result<Self> {
        Ok(Self::with_pipeline(segmenter, Pipeline::from_config(config)?))
    }

    pub fn with_pipeline(segmenter: S, pipeline: Pipeline) -> Self {
        Self {
            segmenter: Arc::new(segmenter),
            pipeline: Arc::new(pipeline),
            timeout: Duration::from_secs(60),
            workers: Arc::new(Semaphore::new(default_workers())),
            tasks: JoinSet::new(),
            submitted: HashMap::new(),
        }
    }

    /// Per-image classifier timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of refinements allowed to run at once.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Arc::new(Semaphore::new(workers.max(1)));
        self
    }

    /// Start a job. Must be called inside a tokio runtime. The returned
    /// handle cancels this job only.
    pub fn submit(&mut self, job: ImageJob) -> AbortHandle {
        let index = self.submitted.len();
        let id = job.id.clone();
        let segmenter = Arc::clone(&self.segmenter);
        let pipeline = Arc::clone(&self.pipeline);
        let workers = Arc::clone(&self.workers);
        let timeout = self.timeout;

        let handle = self.tasks.spawn(async move {
            let result = refine_job(segmenter.as_ref(), pipeline, workers, timeout, job.image).await;
            match &result {
                Ok(outcome) if outcome.is_degraded() => {
                    tracing::warn!(id = %job.id, notes = outcome.degradations.len(), "refined with degradations")
                }
                Ok(_) => tracing::info!(id = %job.id, "refined"),
                Err(e) => tracing::warn!(id = %job.id, error = %e, "image skipped"),
            }
            JobReport { index, id: job.id, result }
        });
        self.submitted.insert(handle.id(), (index, id));
        handle
    }

    /// Wait for every submitted job. Reports come back in submission order.
    pub async fn join_all(mut self) -> Vec<JobReport> {
        let mut reports = Vec::with_capacity(self.submitted.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    let (index, id) = self.submitted.remove(&e.id()).unwrap_or_default();
                    let error = if e.is_cancelled() {
                        RefineError::Cancelled
                    } else {
                        RefineError::Worker(e.to_string())
                    };
                    tracing::warn!(%id, error = %error, "job did not complete");
                    reports.push(JobReport { index, id, result: Err(error) });
                }
            }
        }
        reports.sort_by_key(|r| r.index);
        reports
    }
}

async fn refine_job<S: Segmenter>(
    segmenter: &S,
    pipeline: Arc<Pipeline>,
    workers: Arc<Semaphore>,
    timeout: Duration,
    image: RgbImage,
) -> Result<RefinementOutcome> {
    let grid = tokio::time::timeout(timeout, segmenter.segment(&image))
        .await
        .map_err(|_| RefineError::ClassifierTimeout { after: timeout })??;
    if grid.dimensions() != image.dimensions() {
        return Err(RefineError::dimension_mismatch(image.dimensions(), grid.dimensions()));
    }

    let permit = workers
        .acquire_owned()
        .await
        .map_err(|_| RefineError::Cancelled)?;
    let grid = Arc::new(grid);
    let image = Arc::new(image);
    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        pipeline.run(grid, Some(image))
    })
    .await
    .map_err(|e| RefineError::Worker(e.to_string()))?
}

/// Refine grids that are already available, in parallel on the rayon pool.
/// Results keep the input order; one failure does not stop the others,
/// and a panicking refinement is reported as [`RefineError::Worker`].
pub fn refine_many(
    pipeline: &Pipeline,
    inputs: Vec<(ProbabilityGrid, Option<RgbImage>)>,
) -> Vec<Result<RefinementOutcome>> {
    inputs
        .into_par_iter()
        .map(|(grid, image)| {
            panic::catch_unwind(AssertUnwindSafe(|| {
                pipeline.run(Arc::new(grid), image.map(Arc::new))
            }))
            .unwrap_or_else(|payload| Err(RefineError::Worker(panic_message(payload.as_ref()))))
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "refinement panicked".to_string())
}
