//! Execution plan - invocations ordered so every dependency runs first.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::foundation::InvocationId;
use crate::domain::intent::Invocation;

/// One invocation placed in the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStep {
    invocation: Invocation,
    depends_on: BTreeSet<InvocationId>,
    /// Longest dependency chain leading to this step. Steps sharing a wave
    /// have no path between them and may run concurrently.
    wave: usize,
}

impl PlannedStep {
    pub(super) fn new(invocation: Invocation, depends_on: BTreeSet<InvocationId>, wave: usize) -> Self {
        Self {
            invocation,
            depends_on,
            wave,
        }
    }

    pub fn id(&self) -> InvocationId {
        self.invocation.id()
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn tool(&self) -> &str {
        self.invocation.tool()
    }

    pub fn depends_on(&self) -> &BTreeSet<InvocationId> {
        &self.depends_on
    }

    pub fn wave(&self) -> usize {
        self.wave
    }
}

/// An immutable, topologically ordered plan.
///
/// Only the planner constructs plans, so every plan satisfies: each step's
/// dependencies appear earlier, every reference targets a declared output,
/// and the dependency graph is acyclic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionPlan {
    steps: Vec<PlannedStep>,
    #[serde(skip)]
    positions: HashMap<InvocationId, usize>,
}

impl ExecutionPlan {
    pub(super) fn new(steps: Vec<PlannedStep>) -> Self {
        let positions = steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id(), i))
            .collect();
        Self { steps, positions }
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn step(&self, id: InvocationId) -> Option<&PlannedStep> {
        self.positions.get(&id).map(|&i| &self.steps[i])
    }

    /// Position of a step in plan order.
    pub fn position(&self, id: InvocationId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Ids in plan order.
    pub fn order(&self) -> Vec<InvocationId> {
        self.steps.iter().map(PlannedStep::id).collect()
    }

    /// Dependency edges as (dependency, dependent) pairs.
    pub fn edges(&self) -> Vec<(InvocationId, InvocationId)> {
        self.steps
            .iter()
            .flat_map(|s| s.depends_on.iter().map(move |dep| (*dep, s.id())))
            .collect()
    }

    /// Steps grouped by wave; each group may run concurrently.
    pub fn concurrent_groups(&self) -> Vec<Vec<InvocationId>> {
        let waves = self.steps.iter().map(|s| s.wave + 1).max().unwrap_or(0);
        let mut groups = vec![Vec::new(); waves];
        for step in &self.steps {
            groups[step.wave].push(step.id());
        }
        groups
    }

    /// Steps that directly depend on `id`.
    pub fn dependents(&self, id: InvocationId) -> Vec<InvocationId> {
        self.steps
            .iter()
            .filter(|s| s.depends_on.contains(&id))
            .map(PlannedStep::id)
            .collect()
    }

    /// True when there is a dependency path from `from` to `to`.
    pub fn reaches(&self, from: InvocationId, to: InvocationId) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            for next in self.dependents(current) {
                if next == to {
                    return true;
                }
                stack.push(next);
            }
        }
        false
    }

    /// True when neither step depends on the other, directly or transitively.
    pub fn are_independent(&self, a: InvocationId, b: InvocationId) -> bool {
        a != b && !self.reaches(a, b) && !self.reaches(b, a)
    }
}
