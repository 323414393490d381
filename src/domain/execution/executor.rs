//! Plan executor.
//!
//! Runs a plan as a dataflow: a step starts as soon as all of its
//! dependencies have settled, bounded by a semaphore. Independent steps run
//! concurrently. A step whose dependency did not succeed is skipped without
//! invoking its adapter, and the skip propagates to its own dependents.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use super::{SkipReason, StepErrorKind, StepResult, StepStatus};
use crate::domain::foundation::{InvocationId, Timestamp};
use crate::domain::intent::ParamValue;
use crate::domain::planning::{ExecutionPlan, PlannedStep};
use crate::domain::registry::ToolRegistry;
use crate::ports::{AdapterError, ResolvedCall, ToolAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Upper bound on a single adapter call.
    pub step_timeout: Duration,
    /// Maximum adapter calls in flight for one plan.
    pub max_concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(10),
            max_concurrency: 4,
        }
    }
}

/// Results of running a plan, one per step in plan order.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub results: Vec<StepResult>,
    /// Cancellation was requested while the plan ran.
    pub cancelled: bool,
}

impl ExecutionReport {
    pub fn count(&self, status: StepStatus) -> usize {
        self.results.iter().filter(|r| r.status() == status).count()
    }
}

pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs every step of the plan to completion.
    pub async fn execute(&self, plan: &ExecutionPlan, registry: &ToolRegistry) -> ExecutionReport {
        self.execute_with_cancel(plan, registry, CancellationToken::new())
            .await
    }

    /// Runs the plan until done or cancelled.
    ///
    /// After cancellation no further step is started; steps not yet started
    /// are recorded as skipped. Steps already calling their adapter finish
    /// or hit the step timeout.
    ///
    /// Each adapter call runs on its own task, so it also completes when the
    /// caller stops polling this future.
    pub async fn execute_with_cancel(
        &self,
        plan: &ExecutionPlan,
        registry: &ToolRegistry,
        cancel: CancellationToken,
    ) -> ExecutionReport {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut pending: HashMap<InvocationId, usize> = plan
            .steps()
            .iter()
            .map(|s| (s.id(), s.depends_on().len()))
            .collect();
        let mut ready: VecDeque<InvocationId> = plan
            .steps()
            .iter()
            .filter(|s| s.depends_on().is_empty())
            .map(PlannedStep::id)
            .collect();
        let mut results: HashMap<InvocationId, StepResult> = HashMap::with_capacity(plan.len());
        let mut in_flight = FuturesUnordered::new();

        loop {
            while let Some(id) = ready.pop_front() {
                let Some(step) = plan.step(id) else { continue };
                match self.prepare(step, &results, registry, &cancel) {
                    Ok((call, adapter)) => {
                        let tool = call.tool.clone();
                        let task = tokio::spawn(run_step(
                            id,
                            call,
                            adapter,
                            Arc::clone(&semaphore),
                            cancel.clone(),
                            self.config.step_timeout,
                        )
                        .in_current_span());
                        in_flight.push(async move {
                            task.await.unwrap_or_else(|e| {
                                warn!(step = %id, %tool, error = %e, "Step task ended abnormally");
                                StepResult::failure(
                                    id,
                                    tool,
                                    StepErrorKind::AdapterFailure {
                                        message: e.to_string(),
                                    },
                                )
                            })
                        });
                    }
                    Err(result) => settle(plan, result, &mut results, &mut pending, &mut ready),
                }
            }

            match in_flight.next().await {
                Some(result) => settle(plan, result, &mut results, &mut pending, &mut ready),
                None => break,
            }
        }

        let report = ExecutionReport {
            results: plan
                .steps()
                .iter()
                .filter_map(|s| results.remove(&s.id()))
                .collect(),
            cancelled: cancel.is_cancelled(),
        };
        info!(
            steps = report.results.len(),
            succeeded = report.count(StepStatus::Success),
            failed = report.count(StepStatus::Failure),
            skipped = report.count(StepStatus::Skipped),
            cancelled = report.cancelled,
            "Plan executed"
        );
        report
    }

    /// Resolves references and picks the adapter, or settles the step
    /// immediately when it cannot run.
    fn prepare(
        &self,
        step: &PlannedStep,
        results: &HashMap<InvocationId, StepResult>,
        registry: &ToolRegistry,
        cancel: &CancellationToken,
    ) -> Result<(ResolvedCall, Arc<dyn ToolAdapter>), StepResult> {
        let id = step.id();
        let tool = step.tool();

        if cancel.is_cancelled() {
            return Err(StepResult::skipped(id, tool, SkipReason::Cancelled));
        }

        if let Some(dependency) = step
            .depends_on()
            .iter()
            .find(|dep| !results.get(*dep).is_some_and(StepResult::is_success))
        {
            info!(step = %id, tool, dependency = %dependency, "Skipping step");
            return Err(StepResult::skipped(
                id,
                tool,
                SkipReason::DependencyFailed {
                    dependency: *dependency,
                },
            ));
        }

        let mut parameters = Map::new();
        for (name, value) in step.invocation().parameters() {
            let resolved = match value {
                ParamValue::Literal(literal) => literal.clone(),
                ParamValue::Reference(reference) => results
                    .get(&reference.step)
                    .and_then(StepResult::payload)
                    .and_then(|payload| payload.get(&reference.field))
                    .filter(|v| !v.is_null())
                    .cloned()
                    .ok_or_else(|| {
                        warn!(step = %id, dependency = %reference.step, field = %reference.field, "Referenced output missing");
                        StepResult::failure(
                            id,
                            tool,
                            StepErrorKind::MissingOutput {
                                dependency: reference.step,
                                field: reference.field.clone(),
                            },
                        )
                    })?,
            };
            parameters.insert(name.clone(), resolved);
        }

        let adapter = registry.adapter(tool).map_err(|e| {
            StepResult::failure(
                id,
                tool,
                StepErrorKind::AdapterFailure {
                    message: e.to_string(),
                },
            )
        })?;

        Ok((ResolvedCall::new(tool, parameters), adapter))
    }
}

/// Records a settled step and releases dependents whose inputs are all settled.
fn settle(
    plan: &ExecutionPlan,
    result: StepResult,
    results: &mut HashMap<InvocationId, StepResult>,
    pending: &mut HashMap<InvocationId, usize>,
    ready: &mut VecDeque<InvocationId>,
) {
    let id = result.invocation();
    results.insert(id, result);
    for dependent in plan.dependents(id) {
        if let Some(count) = pending.get_mut(&dependent) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                ready.push_back(dependent);
            }
        }
    }
}

async fn run_step(
    id: InvocationId,
    call: ResolvedCall,
    adapter: Arc<dyn ToolAdapter>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    step_timeout: Duration,
) -> StepResult {
    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return StepResult::skipped(id, call.tool.clone(), SkipReason::Cancelled);
        }
        permit = semaphore.acquire_owned() => permit,
    };
    let _permit = match permit {
        Ok(permit) => permit,
        Err(_) => {
            return StepResult::failure(
                id,
                call.tool.clone(),
                StepErrorKind::AdapterFailure {
                    message: "executor semaphore closed".to_string(),
                },
            );
        }
    };

    let started = Timestamp::now();
    debug!(step = %id, tool = %call.tool, adapter = adapter.kind(), "Invoking tool");

    let outcome = tokio::time::timeout(step_timeout, adapter.invoke(&call)).await;
    let result = match outcome {
        Ok(Ok(payload)) => StepResult::success(id, &call.tool, payload),
        Ok(Err(AdapterError::Timeout { timeout_ms })) => {
            StepResult::failure(id, &call.tool, StepErrorKind::AdapterTimeout { timeout_ms })
        }
        Ok(Err(error)) => StepResult::failure(
            id,
            &call.tool,
            StepErrorKind::AdapterFailure {
                message: error.to_string(),
            },
        ),
        Err(_) => StepResult::failure(
            id,
            &call.tool,
            StepErrorKind::AdapterTimeout {
                timeout_ms: step_timeout.as_millis() as u64,
            },
        ),
    }
    .timed_from(started);

    match result.error() {
        Some(error) => warn!(step = %id, tool = %call.tool, %error, "Step failed"),
        None => debug!(step = %id, tool = %call.tool, duration_ms = result.duration_ms(), "Step succeeded"),
    }
    result
}
