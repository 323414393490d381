//! Dependency planner.
//!
//! Builds the dependency graph implied by the references between
//! invocations, validates it against the registry, and orders it with
//! Kahn's algorithm. Ties between ready steps are broken by their position
//! in the parse, so the same invocations always produce the same plan.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use tracing::debug;

use super::{ExecutionPlan, PlanError, PlannedStep};
use crate::domain::foundation::InvocationId;
use crate::domain::intent::Invocation;
use crate::domain::registry::ToolRegistry;

pub struct Planner;

impl Planner {
    /// Plans a set of invocations.
    ///
    /// # Errors
    ///
    /// - [`PlanError::UnknownTool`] if a tool is not registered
    /// - [`PlanError::DuplicateInvocation`] if two invocations share an id
    /// - [`PlanError::UnresolvedReference`] if a reference targets a missing
    ///   invocation or an output field its tool does not declare
    /// - [`PlanError::CyclicDependency`] on self-references or cycles
    pub fn plan(
        invocations: Vec<Invocation>,
        registry: &ToolRegistry,
    ) -> Result<ExecutionPlan, PlanError> {
        let mut index: HashMap<InvocationId, usize> = HashMap::with_capacity(invocations.len());
        for (position, invocation) in invocations.iter().enumerate() {
            if index.insert(invocation.id(), position).is_some() {
                return Err(PlanError::DuplicateInvocation(invocation.id()));
            }
        }

        for invocation in &invocations {
            registry
                .lookup(invocation.tool())
                .map_err(|_| PlanError::UnknownTool(invocation.tool().to_string()))?;
        }

        let mut depends_on: Vec<BTreeSet<InvocationId>> = Vec::with_capacity(invocations.len());
        for invocation in &invocations {
            for (_, reference) in invocation.references() {
                if reference.step == invocation.id() {
                    return Err(PlanError::CyclicDependency {
                        steps: vec![invocation.id()],
                    });
                }
                let unresolved = |reason: String| PlanError::UnresolvedReference {
                    step: invocation.id(),
                    target: reference.step,
                    field: reference.field.clone(),
                    reason,
                };
                let target = index
                    .get(&reference.step)
                    .map(|&i| &invocations[i])
                    .ok_or_else(|| unresolved("no such invocation".to_string()))?;
                let target_spec = registry
                    .lookup(target.tool())
                    .map_err(|_| PlanError::UnknownTool(target.tool().to_string()))?;
                if !target_spec.declares_output(&reference.field) {
                    return Err(unresolved(format!(
                        "{} does not declare output '{}'",
                        target.tool(),
                        reference.field
                    )));
                }
            }
            depends_on.push(invocation.dependencies());
        }

        let order = topological_order(&invocations, &depends_on, &index)?;

        let mut waves: HashMap<InvocationId, usize> = HashMap::with_capacity(invocations.len());
        let mut slots: Vec<Option<Invocation>> = invocations.into_iter().map(Some).collect();
        let mut steps = Vec::with_capacity(order.len());
        for position in order {
            let deps = std::mem::take(&mut depends_on[position]);
            let wave = deps
                .iter()
                .filter_map(|d| waves.get(d))
                .map(|w| w + 1)
                .max()
                .unwrap_or(0);
            if let Some(invocation) = slots[position].take() {
                waves.insert(invocation.id(), wave);
                steps.push(PlannedStep::new(invocation, deps, wave));
            }
        }

        let plan = ExecutionPlan::new(steps);
        debug!(
            steps = plan.len(),
            waves = plan.concurrent_groups().len(),
            "Built execution plan"
        );
        Ok(plan)
    }
}

/// Kahn's algorithm over positions, smallest position first among ready steps.
fn topological_order(
    invocations: &[Invocation],
    depends_on: &[BTreeSet<InvocationId>],
    index: &HashMap<InvocationId, usize>,
) -> Result<Vec<usize>, PlanError> {
    let n = invocations.len();
    let mut in_degree: Vec<usize> = depends_on.iter().map(BTreeSet::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (position, deps) in depends_on.iter().enumerate() {
        for dep in deps {
            if let Some(&dep_position) = index.get(dep) {
                dependents[dep_position].push(position);
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| in_degree[i] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(Reverse(position)) = ready.pop() {
        order.push(position);
        for &dependent in &dependents[position] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    if order.len() < n {
        let steps = (0..n)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| invocations[i].id())
            .collect();
        return Err(PlanError::CyclicDependency { steps });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intent::{ParamValue, Reference};
    use crate::domain::registry::{ParameterSpec, ParameterType, ToolSpec};
    use crate::ports::{AdapterError, ResolvedCall, ToolAdapter};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    struct NoopAdapter;

    #[async_trait]
    impl ToolAdapter for NoopAdapter {
        async fn invoke(&self, _call: &ResolvedCall) -> Result<Value, AdapterError> {
            Ok(Value::Null)
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for name in ["weather", "news", "currency", "relay"] {
            let spec = ToolSpec::new(name, name)
                .with_parameter(ParameterSpec::optional("input", ParameterType::String))
                .with_parameter(ParameterSpec::optional("other", ParameterType::String))
                .with_outputs(["out", "city", "converted_amount", "to"]);
            registry.register(spec, Arc::new(NoopAdapter)).unwrap();
        }
        registry
    }

    fn literal(id: usize, tool: &str) -> Invocation {
        let mut params = BTreeMap::new();
        params.insert("input".to_string(), ParamValue::literal("x"));
        Invocation::new(InvocationId::new(id), tool, params, tool)
    }

    fn referencing(id: usize, tool: &str, targets: &[(usize, &str)]) -> Invocation {
        let names = ["input", "other"];
        let mut params = BTreeMap::new();
        for (i, (target, field)) in targets.iter().enumerate() {
            params.insert(
                names[i].to_string(),
                ParamValue::Reference(Reference::new(InvocationId::new(*target), *field)),
            );
        }
        Invocation::new(InvocationId::new(id), tool, params, tool)
    }

    fn ids(order: Vec<InvocationId>) -> Vec<usize> {
        order.into_iter().map(|i| i.index()).collect()
    }

    #[test]
    fn independent_invocations_share_a_wave() {
        let plan = Planner::plan(vec![literal(0, "weather"), literal(1, "news")], &registry()).unwrap();

        assert_eq!(ids(plan.order()), vec![0, 1]);
        assert!(plan.edges().is_empty());
        assert_eq!(plan.concurrent_groups().len(), 1);
        assert!(plan.are_independent(InvocationId::new(0), InvocationId::new(1)));
    }

    #[test]
    fn dependent_invocation_runs_after_its_dependency() {
        let plan = Planner::plan(
            vec![
                literal(0, "currency"),
                referencing(1, "currency", &[(0, "converted_amount"), (0, "to")]),
            ],
            &registry(),
        )
        .unwrap();

        assert_eq!(ids(plan.order()), vec![0, 1]);
        assert_eq!(plan.edges(), vec![(InvocationId::new(0), InvocationId::new(1))]);
        assert_eq!(plan.step(InvocationId::new(1)).unwrap().wave(), 1);
        assert!(!plan.are_independent(InvocationId::new(0), InvocationId::new(1)));
    }

    #[test]
    fn forward_reference_is_reordered() {
        let plan = Planner::plan(
            vec![referencing(0, "news", &[(1, "city")]), literal(1, "weather")],
            &registry(),
        )
        .unwrap();
        assert_eq!(ids(plan.order()), vec![1, 0]);
    }

    #[test]
    fn ties_are_broken_by_parse_position() {
        let plan = Planner::plan(
            vec![
                literal(0, "weather"),
                referencing(1, "relay", &[(0, "out")]),
                literal(2, "news"),
                referencing(3, "relay", &[(2, "out")]),
            ],
            &registry(),
        )
        .unwrap();
        assert_eq!(ids(plan.order()), vec![0, 1, 2, 3]);
        assert_eq!(
            plan.concurrent_groups(),
            vec![
                vec![InvocationId::new(0), InvocationId::new(2)],
                vec![InvocationId::new(1), InvocationId::new(3)],
            ]
        );
        assert!(plan.are_independent(InvocationId::new(1), InvocationId::new(2)));
        assert!(plan.reaches(InvocationId::new(2), InvocationId::new(3)));
    }

    #[test]
    fn unknown_tool_fails() {
        let err = Planner::plan(vec![literal(0, "stocks")], &registry()).unwrap_err();
        assert_eq!(err, PlanError::UnknownTool("stocks".into()));
    }

    #[test]
    fn reference_to_undeclared_field_fails() {
        let err = Planner::plan(
            vec![literal(0, "weather"), referencing(1, "news", &[(0, "humidity")])],
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::UnresolvedReference { ref field, .. } if field == "humidity"));
    }

    #[test]
    fn reference_to_missing_invocation_fails() {
        let err = Planner::plan(vec![referencing(0, "news", &[(4, "city")])], &registry()).unwrap_err();
        assert!(matches!(err, PlanError::UnresolvedReference { .. }));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let err = Planner::plan(vec![referencing(0, "relay", &[(0, "out")])], &registry()).unwrap_err();
        assert_eq!(
            err,
            PlanError::CyclicDependency {
                steps: vec![InvocationId::new(0)]
            }
        );
    }

    #[test]
    fn mutual_references_are_a_cycle() {
        let err = Planner::plan(
            vec![
                referencing(0, "relay", &[(1, "out")]),
                referencing(1, "relay", &[(0, "out")]),
                literal(2, "weather"),
            ],
            &registry(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PlanError::CyclicDependency {
                steps: vec![InvocationId::new(0), InvocationId::new(1)]
            }
        );
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = Planner::plan(vec![literal(0, "weather"), literal(0, "news")], &registry()).unwrap_err();
        assert_eq!(err, PlanError::DuplicateInvocation(InvocationId::new(0)));
    }

    #[test]
    fn empty_input_gives_empty_plan() {
        let plan = Planner::plan(Vec::new(), &registry()).unwrap();
        assert!(plan.is_empty());
        assert!(plan.concurrent_groups().is_empty());
    }

    /// Random DAG: each invocation may reference any earlier one.
    fn dag_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
        (1usize..10).prop_flat_map(|n| {
            (0..n)
                .map(|i| proptest::collection::vec(0..i.max(1), 0..=2.min(i)))
                .collect::<Vec<_>>()
        })
    }

    proptest! {
        #[test]
        fn plan_respects_every_dependency(dag in dag_strategy(), reverse in any::<bool>()) {
            let mut invocations: Vec<Invocation> = dag
                .iter()
                .enumerate()
                .map(|(i, targets)| {
                    let refs: Vec<(usize, &str)> = targets
                        .iter()
                        .filter(|t| **t < i)
                        .map(|t| (*t, "out"))
                        .collect();
                    referencing(i, "relay", &refs)
                })
                .collect();
            if reverse {
                invocations.reverse();
            }
            let count = invocations.len();

            let plan = Planner::plan(invocations, &registry()).unwrap();

            prop_assert_eq!(plan.len(), count);
            for step in plan.steps() {
                let position = plan.position(step.id()).unwrap();
                for dep in step.depends_on() {
                    prop_assert!(plan.position(*dep).unwrap() < position);
                    prop_assert!(plan.step(*dep).unwrap().wave() < step.wave());
                }
            }
        }

        #[test]
        fn planning_is_deterministic(dag in dag_strategy()) {
            let build = || -> Vec<Invocation> {
                dag.iter()
                    .enumerate()
                    .map(|(i, targets)| {
                        let refs: Vec<(usize, &str)> =
                            targets.iter().filter(|t| **t < i).map(|t| (*t, "out")).collect();
                        referencing(i, "relay", &refs)
                    })
                    .collect()
            };
            let first = Planner::plan(build(), &registry()).unwrap();
            let second = Planner::plan(build(), &registry()).unwrap();
            prop_assert_eq!(first.order(), second.order());
        }
    }
}
