//! Label reconciliation: desired directives vs. one remote snapshot.
//!
//! Pure and infallible. Every output sequence follows manifest order,
//! except removals and unconfigured labels which follow remote order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use labelsync_core::{Label, LabelDirective, RepoPolicy};

/// Mutation intents for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelDiff {
    /// Labels to create.
    pub additions: Vec<Label>,
    /// Labels to update in place. `old_name` is set for renames; `old_color`
    /// and `old_description` hold the remote definition.
    pub updates: Vec<Label>,
    /// Remote labels to delete (strict repositories only).
    pub removals: Vec<Label>,
    /// Remote labels the manifest does not configure, left in place.
    pub unconfigured: Vec<Label>,
    /// Renamed labels to add next to their old name on open issues.
    pub aliases: Vec<Label>,
}

impl LabelDiff {
    /// No label definition needs to change.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.updates.is_empty() && self.removals.is_empty()
    }
}

/// Diff `directives` against `remote`.
///
/// - A rename whose source exists remotely is always an update, even when
///   the definitions are otherwise identical.
/// - A rename whose source is missing falls back to a plain definition.
/// - A rename whose source is itself configured by name, or whose target
///   already exists, keeps the source and only defines and aliases the
///   target.
/// - A rename is aliased only while its source label is still in use.
/// - Default labels are never removed.
pub fn reconcile(directives: &[LabelDirective], remote: &[Label], policy: RepoPolicy) -> LabelDiff {
    let by_name: HashMap<&str, &Label> = remote.iter().map(|l| (l.name.as_str(), l)).collect();
    let configured: HashSet<&str> = directives.iter().map(|d| d.label().name.as_str()).collect();

    let mut diff = LabelDiff::default();

    for directive in directives {
        let desired = directive.label();

        if let LabelDirective::Rename { from, to } = directive {
            let source_configured = configured.contains(from.as_str());
            let source = by_name.get(from.as_str());
            if source.is_some() || source_configured {
                diff.aliases.push(to.clone());
            }
            // Renaming onto an existing name would be rejected; the target
            // is then reconciled by name and the source is left in place.
            let target_exists = by_name.contains_key(to.name.as_str());
            if let (Some(current), false, false) = (source, source_configured, target_exists) {
                tracing::debug!(from = %from, to = %to.name, "rename");
                diff.updates.push(updated(to, current, Some(from)));
                continue;
            }
        }

        match by_name.get(desired.name.as_str()) {
            Some(current) if desired.is_identical(current) => {}
            Some(current) => {
                tracing::debug!(label = %desired.name, "changed");
                diff.updates.push(updated(desired, current, None));
            }
            None => {
                tracing::debug!(label = %desired.name, "new");
                diff.additions.push(Label {
                    old_name: None,
                    ..desired.clone()
                });
            }
        }
    }

    let renamed: HashSet<&str> = directives.iter().filter_map(LabelDirective::old_name).collect();
    let unmanaged = remote.iter().filter(|label| {
        let name = label.name.as_str();
        !label.default && !configured.contains(name) && !renamed.contains(name)
    });

    if policy.strict {
        diff.removals = unmanaged.cloned().collect();
    } else {
        diff.unconfigured = unmanaged.cloned().collect();
    }

    diff
}

fn updated(desired: &Label, current: &Label, old_name: Option<&str>) -> Label {
    Label {
        name: desired.name.clone(),
        color: desired.color.clone(),
        description: desired.description.clone(),
        old_name: old_name.map(str::to_owned),
        old_color: Some(current.color.clone()),
        old_description: current.description.clone(),
        default: current.default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn define(name: &str, color: &str) -> LabelDirective {
        LabelDirective::Define(Label::new(name, color))
    }

    fn rename(from: &str, name: &str, color: &str) -> LabelDirective {
        LabelDirective::Rename {
            from: from.to_owned(),
            to: Label::new(name, color).renamed_from(from),
        }
    }

    fn strict() -> RepoPolicy {
        RepoPolicy {
            strict: true,
            ..RepoPolicy::default()
        }
    }

    fn names(labels: &[Label]) -> Vec<&str> {
        labels.iter().map(|l| l.name.as_str()).collect()
    }

    /// Apply intents the way a remote would, for fixed-point checks.
    fn apply(remote: &[Label], diff: &LabelDiff) -> Vec<Label> {
        let mut next: Vec<Label> = remote
            .iter()
            .filter(|l| !diff.removals.iter().any(|r| r.name == l.name))
            .cloned()
            .collect();
        for update in &diff.updates {
            let current = update.old_name.as_deref().unwrap_or(&update.name);
            if let Some(label) = next.iter_mut().find(|l| l.name == current) {
                label.name = update.name.clone();
                label.color = update.color.clone();
                label.description = update.description.clone();
            }
        }
        next.extend(diff.additions.iter().cloned());
        next
    }

    #[test]
    fn disjoint_sets_are_all_additions() {
        let directives = [define("bug", "f00"), define("docs", "00f")];
        let remote = [Label::new("other", "000").as_default()];
        let diff = reconcile(&directives, &remote, strict());
        assert_eq!(names(&diff.additions), ["bug", "docs"]);
        assert!(diff.updates.is_empty());
        assert!(diff.removals.is_empty());
    }

    #[test]
    fn strict_example_from_manifest() {
        let directives = [define("bug", "f00"), rename("help", "help-wanted", "0f0")];
        let remote = [Label::new("help", "0f0"), Label::new("legacy", "000")];

        let diff = reconcile(&directives, &remote, strict());
        assert_eq!(names(&diff.additions), ["bug"]);
        assert_eq!(names(&diff.updates), ["help-wanted"]);
        assert_eq!(diff.updates[0].old_name.as_deref(), Some("help"));
        assert_eq!(names(&diff.removals), ["legacy"]);
        assert!(diff.unconfigured.is_empty());
        assert_eq!(names(&diff.aliases), ["help-wanted"]);
    }

    #[test]
    fn non_strict_reports_unconfigured_only() {
        let directives = [define("bug", "f00"), rename("help", "help-wanted", "0f0")];
        let remote = [Label::new("help", "0f0"), Label::new("legacy", "000")];

        let diff = reconcile(&directives, &remote, RepoPolicy::default());
        assert!(diff.removals.is_empty());
        assert_eq!(names(&diff.unconfigured), ["legacy"]);
    }

    #[rstest]
    #[case::identical("0f0", None)]
    #[case::recolored("abc", None)]
    #[case::described("0f0", Some("needs hands"))]
    fn rename_with_existing_source_is_always_update(
        #[case] color: &str,
        #[case] description: Option<&str>,
    ) {
        let mut to = Label::new("help-wanted", color).renamed_from("help");
        to.description = description.map(str::to_owned);
        let directives = [LabelDirective::Rename {
            from: "help".into(),
            to,
        }];
        let remote = [Label::new("help", "0f0")];

        let diff = reconcile(&directives, &remote, strict());
        assert!(diff.additions.is_empty());
        assert_eq!(names(&diff.updates), ["help-wanted"]);
        assert_eq!(diff.updates[0].old_color.as_deref(), Some("0f0"));
    }

    #[test]
    fn rename_without_source_becomes_addition() {
        let directives = [rename("help", "help-wanted", "0f0")];
        let diff = reconcile(&directives, &[], strict());
        assert_eq!(names(&diff.additions), ["help-wanted"]);
        assert_eq!(diff.additions[0].old_name, None);
        assert!(diff.updates.is_empty());
        assert!(diff.aliases.is_empty());
    }

    #[test]
    fn rename_already_applied_is_a_no_op() {
        let directives = [rename("help", "help-wanted", "0f0")];
        let remote = [Label::new("help-wanted", "0f0")];
        assert!(reconcile(&directives, &remote, strict()).is_empty());
    }

    #[test]
    fn rename_already_applied_has_no_aliases() {
        let directives = [rename("help", "help-wanted", "0f0")];
        let remote = [Label::new("help-wanted", "0f0")];
        let diff = reconcile(&directives, &remote, strict());
        assert!(diff.aliases.is_empty());
    }

    #[test]
    fn rename_onto_existing_target_keeps_both() {
        let directives = [rename("help", "help-wanted", "0f0")];
        let remote = [Label::new("help", "0f0"), Label::new("help-wanted", "abc")];

        let diff = reconcile(&directives, &remote, strict());
        assert!(diff.additions.is_empty());
        assert_eq!(names(&diff.updates), ["help-wanted"]);
        assert_eq!(diff.updates[0].old_name, None);
        assert_eq!(diff.updates[0].old_color.as_deref(), Some("abc"));
        assert!(diff.removals.is_empty());
        assert_eq!(names(&diff.aliases), ["help-wanted"]);
    }

    #[test]
    fn rename_onto_identical_target_only_aliases() {
        let directives = [rename("help", "help-wanted", "0f0")];
        let remote = [Label::new("help", "0f0"), Label::new("help-wanted", "0f0")];

        let diff = reconcile(&directives, &remote, strict());
        assert!(diff.is_empty(), "{diff:?}");
        assert_eq!(names(&diff.aliases), ["help-wanted"]);
    }

    #[test]
    fn rename_source_still_configured_is_kept() {
        let directives = [define("help", "0f0"), rename("help", "help-wanted", "0f0")];
        let remote = [Label::new("help", "0f0")];

        let diff = reconcile(&directives, &remote, strict());
        assert_eq!(names(&diff.additions), ["help-wanted"]);
        assert!(diff.updates.is_empty());
        assert!(diff.removals.is_empty());
        assert_eq!(names(&diff.aliases), ["help-wanted"]);
    }

    #[test]
    fn changed_definition_is_update() {
        let directives = [LabelDirective::Define(
            Label::new("bug", "f00").with_description("Broken"),
        )];
        let remote = [Label::new("bug", "F00")];

        let diff = reconcile(&directives, &remote, strict());
        assert_eq!(names(&diff.updates), ["bug"]);
        assert_eq!(diff.updates[0].old_name, None);
        assert_eq!(diff.updates[0].old_description, None);
    }

    #[test]
    fn default_labels_are_never_removed() {
        let remote = [
            Label::new("good first issue", "7057ff").as_default(),
            Label::new("stale", "eee"),
        ];
        let diff = reconcile(&[], &remote, strict());
        assert_eq!(names(&diff.removals), ["stale"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let directives = [define("Bug", "f00")];
        let remote = [Label::new("bug", "f00")];
        let diff = reconcile(&directives, &remote, strict());
        assert_eq!(names(&diff.additions), ["Bug"]);
        assert_eq!(names(&diff.removals), ["bug"]);
    }

    #[test]
    fn applying_intents_reaches_fixed_point() {
        let directives = [
            define("bug", "f00"),
            rename("help", "help-wanted", "0f0"),
            LabelDirective::Define(Label::new("docs", "00f").with_description("Docs")),
        ];
        let remote = vec![
            Label::new("help", "0f0"),
            Label::new("docs", "00f"),
            Label::new("legacy", "000"),
            Label::new("wontfix", "fff").as_default(),
        ];

        let first = reconcile(&directives, &remote, strict());
        assert!(!first.is_empty());

        let after = apply(&remote, &first);
        let second = reconcile(&directives, &after, strict());
        assert!(second.additions.is_empty(), "{second:?}");
        assert!(second.updates.is_empty(), "{second:?}");
        assert!(second.removals.is_empty(), "{second:?}");
        assert!(second.aliases.is_empty(), "{second:?}");
    }

    #[test]
    fn output_follows_manifest_order() {
        let directives = [define("z", "1"), define("a", "2"), define("m", "3")];
        let diff = reconcile(&directives, &[], strict());
        assert_eq!(names(&diff.additions), ["z", "a", "m"]);
    }
}
