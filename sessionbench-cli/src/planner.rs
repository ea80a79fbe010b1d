//! Case Planner
//!
//! Builds the execution plan by filtering registered cases.
//!
//! Filtering is a regex match on the case key. Registration order is kept:
//! cases run in the order their suite declared them.

use regex::Regex;
use sessionbench_core::{CaseDef, Registry};

/// Execution plan for one suite
#[derive(Debug)]
pub struct ExecutionPlan<'a> {
    /// Cases to run, in order
    pub cases: Vec<&'a CaseDef>,
}

impl ExecutionPlan<'_> {
    /// Number of planned cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// True when no case matched
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Build execution plan from a registry
pub fn build_plan<'a>(registry: &'a Registry, filter: Option<&Regex>) -> ExecutionPlan<'a> {
    let cases = registry
        .iter()
        .filter(|case| filter.is_none_or(|re| re.is_match(case.key())))
        .collect();
    ExecutionPlan { cases }
}
