//! Property-based tests for repository classification.
//!
//! These tests use proptest to generate random repositories and verify that
//! the grouping rules hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::classify::{
        classify, language_group_name, normalize_group_name, ClassificationConfig, GroupClassifier,
        UNASSIGNED_GROUP,
    };
    use crate::inventory::validate_group_name;
    use crate::model::RepositoryRecord;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn repository() -> impl Strategy<Value = RepositoryRecord> {
        (
            any::<u64>(),
            "[a-z][a-z0-9-]{0,20}",
            prop::collection::vec("(team-)?[a-z]{1,8}", 0..4),
            prop::option::of(prop::collection::btree_map("[A-Za-z+# ]{1,10}", any::<u64>(), 0..4)),
        )
            .prop_map(|(id, name, topics, languages)| {
                let mut repo = RepositoryRecord::new(id, name).with_topics(topics);
                repo.languages = languages;
                repo
            })
    }

    fn config() -> impl Strategy<Value = ClassificationConfig> {
        (
            prop::option::of(prop_oneof![
                Just(r"([a-z]+)-(\d+)".to_string()),
                Just(r"^([a-z]+)".to_string()),
                Just(r"(x)?(svc)".to_string()),
                Just(r"([".to_string()),
            ]),
            any::<bool>(),
        )
            .prop_map(|(regex_filter, group_by_languages)| ClassificationConfig {
                regex_filter,
                group_by_languages,
            })
    }

    proptest! {
        /// Property: every repository lands in at least one group
        #[test]
        fn classification_is_never_empty(repo in repository(), cfg in config()) {
            let result = classify(&repo, &cfg);
            prop_assert!(!result.is_empty());
            prop_assert!(!result.inventory_groups().is_empty());
        }

        /// Property: group names are unique, before and after normalization
        #[test]
        fn classification_has_no_duplicates(repo in repository(), cfg in config()) {
            let result = classify(&repo, &cfg);
            let raw: HashSet<&String> = result.groups().iter().collect();
            prop_assert_eq!(raw.len(), result.len());

            let groups = result.inventory_groups();
            let normalized: HashSet<&String> = groups.iter().collect();
            prop_assert_eq!(normalized.len(), groups.len());
        }

        /// Property: the same repository and options give the same groups
        #[test]
        fn classification_is_deterministic(repo in repository(), cfg in config()) {
            let classifier = GroupClassifier::new(&cfg);
            prop_assert_eq!(classifier.classify(&repo), classifier.classify(&repo));
            prop_assert_eq!(classifier.classify(&repo), classify(&repo, &cfg));
        }

        /// Property: a team topic decides the team, otherwise "unassigned" is present
        #[test]
        fn team_or_unassigned(repo in repository(), cfg in config()) {
            let result = classify(&repo, &cfg);
            match repo.topics.iter().find(|t| t.starts_with("team-")) {
                Some(team) => {
                    prop_assert_eq!(result.team(), Some(team.as_str()));
                    prop_assert!(result.contains(team));
                }
                None => {
                    prop_assert_eq!(result.team(), None);
                    prop_assert!(result.contains(UNASSIGNED_GROUP));
                }
            }
        }

        /// Property: language group names are always usable group names
        #[test]
        fn language_groups_are_valid(language in "[A-Za-z+#. ]*[A-Za-z]") {
            let group = normalize_group_name(&language_group_name(&language));
            prop_assert!(validate_group_name(&group).is_ok(), "invalid group '{}'", group);
        }
    }
}
