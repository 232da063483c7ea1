//! Selector-based exclusion filtering for package manifest streams.
//!
//! A [`ResourceFilter`] is built once from the configured selector list and
//! applied to each decoded object batch. Only custom resource definitions
//! are ever considered for exclusion; every other kind passes through.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::diag::DiagnosticSink;
use crate::manifest::PackageObject;

/// A selection rule with optional `group` and `name` constraints.
///
/// An empty field leaves that axis unconstrained. Selector contents are
/// never validated; empty group and empty name are both legal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSelector {
    /// API group to match exactly.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group: String,

    /// Resource name to match.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl ResourceSelector {
    /// Parse a command-line selector expression such as
    /// `group=example.org,name=widgets.example.org`.
    pub fn parse(expr: &str) -> Result<Self> {
        let mut selector = Self::default();
        for part in expr.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part.split_once('=').with_context(|| {
                format!("invalid selector expression '{part}': expected key=value")
            })?;
            match key.trim() {
                "group" => selector.group = value.trim().to_string(),
                "name" => selector.name = value.trim().to_string(),
                other => bail!("unknown selector field '{other}' (expected 'group' or 'name')"),
            }
        }
        Ok(selector)
    }
}

impl fmt::Display for ResourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.group.is_empty(), self.name.is_empty()) {
            (true, true) => f.write_str("unconstrained"),
            (false, true) => write!(f, "group={}", self.group),
            (true, false) => write!(f, "name={}", self.name),
            (false, false) => write!(f, "group={},name={}", self.group, self.name),
        }
    }
}

/// Counts reported after a filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Objects before filtering.
    pub original: usize,
    /// Objects after filtering.
    pub filtered: usize,
    /// Objects removed by the pass.
    pub removed: usize,
}

/// Applies exclusion selectors to batches of package objects.
///
/// The selector list and the diagnostic sink are fixed at construction and
/// read-only afterwards, so one instance can serve concurrent callers.
pub struct ResourceFilter {
    excluded: Vec<ResourceSelector>,
    diag: Arc<dyn DiagnosticSink>,
}

impl ResourceFilter {
    /// Create a filter from an ordered selector list and a diagnostic sink.
    pub fn new(excluded: Vec<ResourceSelector>, diag: Arc<dyn DiagnosticSink>) -> Self {
        Self { excluded, diag }
    }

    /// Return the objects that survive the exclusion test, in input order.
    ///
    /// Filtering never fails: objects of unrecognized kinds are always
    /// retained, and an empty selector list retains everything.
    pub fn filter<'a>(&self, objects: &'a [PackageObject]) -> Vec<&'a PackageObject> {
        objects
            .iter()
            .filter(|object| !self.should_exclude(object))
            .collect()
    }

    /// Summarize a filter pass from the original and filtered sequences.
    ///
    /// `removed` saturates at zero if the slices are mismatched.
    pub fn stats(&self, original: &[PackageObject], filtered: &[&PackageObject]) -> FilterStats {
        let original = original.len();
        let filtered = filtered.len();
        FilterStats {
            original,
            filtered,
            removed: original.saturating_sub(filtered),
        }
    }

    fn should_exclude(&self, object: &PackageObject) -> bool {
        let crd = match object {
            PackageObject::CustomResourceDefinition(crd) => crd,
            PackageObject::Other(other) => {
                self.diag.debug(
                    "object is not a custom resource definition, retaining",
                    &[("kind", &other.kind()), ("name", &other.name())],
                );
                return false;
            }
        };

        let kind = crd.kind();
        let name = crd.name();
        let group = crd.group();
        self.diag.debug(
            "inspecting custom resource definition",
            &[("kind", &kind), ("name", &name), ("group", &group)],
        );
        self.diag.debug(
            "evaluating exclusion selectors",
            &[("selectors", &self.excluded)],
        );

        if self.excluded.is_empty() {
            return false;
        }

        self.matches_any(kind, name, group)
    }

    /// True when the object should be dropped: no selector matched it.
    ///
    /// Note the polarity: a matching selector retains its object, so the
    /// selector list acts as a keep-list over custom resource definitions,
    /// and a name-only selector excludes every definition except the named
    /// one.
    fn matches_any(&self, kind: &str, name: &str, group: &str) -> bool {
        for selector in &self.excluded {
            if self.matches(selector, kind, name, group) {
                return false;
            }
        }
        true
    }

    /// Single-selector predicate: true when the selector group is set and
    /// equals the object group, or the selector name is set and differs
    /// from the object name.
    fn matches(&self, selector: &ResourceSelector, kind: &str, name: &str, group: &str) -> bool {
        self.diag.debug(
            "testing selector",
            &[
                ("selector", &selector),
                ("kind", &kind),
                ("name", &name),
                ("group", &group),
            ],
        );
        if !selector.group.is_empty() && selector.group == group {
            return true;
        }
        if !selector.name.is_empty() && selector.name != name {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::MemorySink;
    use crate::manifest;

    fn crd(name: &str, group: &str) -> PackageObject {
        let doc = format!(
            r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: {name}
spec:
  group: {group}
"#
        );
        manifest::parse_stream(&doc).unwrap().remove(0)
    }

    fn deployment(name: &str) -> PackageObject {
        let doc = format!(
            r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: {name}
"#
        );
        manifest::parse_stream(&doc).unwrap().remove(0)
    }

    fn selector(group: &str, name: &str) -> ResourceSelector {
        ResourceSelector {
            group: group.to_string(),
            name: name.to_string(),
        }
    }

    fn filter_with(selectors: Vec<ResourceSelector>) -> ResourceFilter {
        ResourceFilter::new(selectors, Arc::new(MemorySink::default()))
    }

    #[test]
    fn empty_selector_list_retains_everything() {
        let objects = vec![crd("widgets.example.org", "example.org"), deployment("web")];
        let filter = filter_with(vec![]);
        let retained = filter.filter(&objects);
        assert_eq!(retained, vec![&objects[0], &objects[1]]);
    }

    #[test]
    fn unrecognized_kinds_are_never_excluded() {
        let objects = vec![deployment("web"), deployment("worker")];
        let filter = filter_with(vec![selector("", "only-this")]);
        assert_eq!(filter.filter(&objects).len(), 2);
    }

    #[test]
    fn group_match_retains_the_definition() {
        let objects = vec![crd("widgets.example.org", "example.org")];
        let filter = filter_with(vec![selector("example.org", "")]);
        assert_eq!(filter.filter(&objects).len(), 1);
    }

    #[test]
    fn name_mismatch_retains_the_definition() {
        let objects = vec![crd("bar", "example.org")];
        let filter = filter_with(vec![selector("", "foo")]);
        assert_eq!(filter.filter(&objects).len(), 1);
    }

    #[test]
    fn exact_name_match_excludes_the_definition() {
        let objects = vec![crd("foo", "example.org")];
        let filter = filter_with(vec![selector("", "foo")]);
        assert!(filter.filter(&objects).is_empty());
    }

    #[test]
    fn unconstrained_selector_excludes_every_definition() {
        let objects = vec![crd("a.example.org", "example.org"), deployment("web")];
        let filter = filter_with(vec![selector("", "")]);
        let retained = filter.filter(&objects);
        assert_eq!(retained, vec![&objects[1]]);
    }

    #[test]
    fn group_equality_is_checked_before_the_name() {
        // group equal: retained, the exact name match is never consulted
        let filter = filter_with(vec![selector("example.org", "mine")]);
        let matching_group = vec![crd("mine", "example.org")];
        assert_eq!(filter.filter(&matching_group).len(), 1);

        // group differs and the name matches exactly: excluded
        let differing_group = vec![crd("mine", "other.org")];
        assert!(filter.filter(&differing_group).is_empty());
    }

    #[test]
    fn relative_order_is_preserved() {
        let objects = vec![
            crd("widgets.example.org", "example.org"),
            deployment("web"),
            crd("gadgets.example.org", "example.org"),
            crd("widgets.example.org", "other.org"),
        ];
        // definitions named exactly widgets.example.org are dropped
        let filter = filter_with(vec![selector("", "widgets.example.org")]);
        let retained = filter.filter(&objects);
        assert_eq!(retained, vec![&objects[1], &objects[2]]);
    }

    #[test]
    fn first_matching_selector_stops_evaluation() {
        let sink = Arc::new(MemorySink::default());
        let selectors = vec![selector("example.org", ""), selector("", "never-checked")];
        let filter = ResourceFilter::new(selectors, sink.clone());

        let objects = vec![crd("widgets.example.org", "example.org")];
        assert_eq!(filter.filter(&objects).len(), 1);

        let tested = sink
            .entries()
            .iter()
            .filter(|entry| entry.message == "testing selector")
            .count();
        assert_eq!(tested, 1);
    }

    #[test]
    fn diagnostics_describe_each_inspection() {
        let sink = Arc::new(MemorySink::default());
        let filter = ResourceFilter::new(vec![selector("", "foo")], sink.clone());

        let objects = vec![crd("foo", "example.org"), deployment("web")];
        filter.filter(&objects);

        let entries = sink.entries();
        assert!(
            entries
                .iter()
                .any(|entry| entry.message == "inspecting custom resource definition")
        );
        assert!(
            entries
                .iter()
                .any(|entry| entry.message == "object is not a custom resource definition, retaining")
        );
        let tested = entries
            .iter()
            .find(|entry| entry.message == "testing selector")
            .unwrap();
        assert!(
            tested
                .fields
                .iter()
                .any(|(key, value)| key == "group" && value.contains("example.org"))
        );
    }

    #[test]
    fn stats_count_the_removed_objects() {
        let objects = vec![
            crd("foo", "example.org"),
            deployment("web"),
            crd("bar", "example.org"),
        ];
        let filter = filter_with(vec![selector("", "foo")]);
        let retained = filter.filter(&objects);
        let stats = filter.stats(&objects, &retained);
        assert_eq!(
            stats,
            FilterStats {
                original: 3,
                filtered: 2,
                removed: 1,
            }
        );
    }

    #[test]
    fn stats_on_empty_sequences_are_zero() {
        let filter = filter_with(vec![]);
        assert_eq!(filter.stats(&[], &[]), FilterStats::default());
    }

    #[test]
    fn stats_stay_total_on_mismatched_slices() {
        let filter = filter_with(vec![]);
        let objects = vec![deployment("web")];
        let refs: Vec<&PackageObject> = objects.iter().collect();
        assert_eq!(filter.stats(&[], &refs).removed, 0);
    }

    #[test]
    fn concurrent_callers_share_one_filter() {
        let objects = vec![crd("foo", "example.org"), deployment("web")];
        let filter = filter_with(vec![selector("", "foo")]);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| filter.filter(&objects).len()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 1);
            }
        });
    }

    #[test]
    fn selector_expressions_parse() {
        let parsed = ResourceSelector::parse("group=example.org,name=widgets.example.org").unwrap();
        assert_eq!(parsed, selector("example.org", "widgets.example.org"));

        let name_only = ResourceSelector::parse(" name = foo ").unwrap();
        assert_eq!(name_only, selector("", "foo"));

        assert_eq!(
            ResourceSelector::parse("").unwrap(),
            ResourceSelector::default()
        );
    }

    #[test]
    fn selector_expressions_reject_unknown_fields() {
        assert!(ResourceSelector::parse("kind=Deployment").is_err());
        assert!(ResourceSelector::parse("no-equals-sign").is_err());
    }

    #[test]
    fn selectors_display_their_constraints() {
        assert_eq!(
            selector("example.org", "foo").to_string(),
            "group=example.org,name=foo"
        );
        assert_eq!(selector("example.org", "").to_string(), "group=example.org");
        assert_eq!(selector("", "").to_string(), "unconstrained");
    }
}
