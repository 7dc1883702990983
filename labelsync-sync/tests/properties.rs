use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;

use labelsync_core::{Label, LabelDirective, RepoPolicy, RepoRef};
use labelsync_sync::{build_tree, reconcile, GhTree, LabelDiff, MemoryObjectStore, ObjectRemote};

fn policy(strict: bool) -> RepoPolicy {
    RepoPolicy {
        strict,
        remove_unconfigured_labels: strict,
    }
}

fn labels(names: &BTreeMap<String, String>, prefix: &str) -> Vec<Label> {
    names
        .iter()
        .map(|(name, color)| Label::new(format!("{prefix}{name}"), color.clone()))
        .collect()
}

/// Remote state after every intent of `diff` has been carried out.
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
    next.extend(diff.additions.iter().map(|l| Label {
        old_name: None,
        ..l.clone()
    }));
    next
}

/// Directives over a small alphabet so names collide with the remote ones.
/// Each remote label is renamed at most once.
fn directives(entries: &BTreeMap<String, (String, Option<String>)>) -> Vec<LabelDirective> {
    let mut sources = HashSet::new();
    entries
        .iter()
        .map(|(name, (color, from))| {
            let label = Label::new(name.clone(), color.clone());
            match from {
                Some(from) if from != name && sources.insert(from.clone()) => {
                    LabelDirective::Rename {
                        from: from.clone(),
                        to: label.renamed_from(from.clone()),
                    }
                }
                _ => LabelDirective::Define(label),
            }
        })
        .collect()
}

fn tree_strategy() -> impl Strategy<Value = GhTree> {
    let path = (
        prop::collection::vec("[a-z]{1,4}", 0..3),
        "[a-z]{1,6}",
    )
        .prop_map(|(dirs, file)| {
            let mut segments: Vec<String> = dirs.into_iter().map(|d| format!("d_{d}")).collect();
            segments.push(format!("f_{file}.txt"));
            segments.join("/")
        });
    prop::collection::btree_map(path, "[a-zA-Z0-9 ]{0,24}", 0..12)
}

proptest! {
    #[test]
    fn built_tree_reads_back_identically(tree in tree_strategy()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let read = runtime.block_on(async {
            let store = MemoryObjectStore::new("master");
            let repo = RepoRef::new("acme", "acme-labelsync");
            store.create_repository(&repo, "").await.expect("create");
            let handle = build_tree(&store, &repo, &tree).await.expect("build");
            store.read_tree(&handle).expect("read")
        });
        prop_assert_eq!(read, tree);
    }

    #[test]
    fn disjoint_names_are_only_additions(
        desired in prop::collection::btree_map("[a-z]{1,6}", "[0-9a-f]{6}", 0..8),
        existing in prop::collection::btree_map("[a-z]{1,6}", "[0-9a-f]{6}", 0..8),
        strict in any::<bool>(),
    ) {
        let wanted = labels(&desired, "m-");
        let remote = labels(&existing, "r-");
        let directives: Vec<LabelDirective> =
            wanted.iter().cloned().map(LabelDirective::Define).collect();

        let diff = reconcile(&directives, &remote, policy(strict));
        prop_assert_eq!(&diff.additions, &wanted);
        prop_assert!(diff.updates.is_empty());
        prop_assert!(diff.aliases.is_empty());
        let leftover = if strict { &diff.removals } else { &diff.unconfigured };
        prop_assert_eq!(leftover, &remote);
    }

    #[test]
    fn applying_intents_reaches_fixed_point(
        entries in prop::collection::btree_map(
            "[a-d]{1,2}",
            ("[0-9a-f]{6}", prop::option::of("[a-d]{1,2}")),
            0..6,
        ),
        existing in prop::collection::btree_map("[a-d]{1,2}", "[0-9a-f]{6}", 0..6),
        strict in any::<bool>(),
    ) {
        let directives = directives(&entries);
        let remote = labels(&existing, "");

        let first = reconcile(&directives, &remote, policy(strict));
        let next = apply(&remote, &first);
        let second = reconcile(&directives, &next, policy(strict));
        prop_assert!(second.is_empty(), "{:?}", second);
        prop_assert!(second.removals.is_empty());
    }
}
