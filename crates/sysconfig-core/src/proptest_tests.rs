//! Property-based tests for sysconfig-core types.
//!
//! These tests use proptest to verify model invariants across many randomly
//! generated inputs.

use proptest::prelude::*;

use crate::{folder_name, ConfigModel, RegistryEntry};

/// Strategy for generating registry host names.
fn registry_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{1,12}\\.(io|com|local)"
}

/// Strategy for generating registry names with an optional `..port` suffix.
fn registry_with_port_strategy() -> impl Strategy<Value = String> {
    (registry_strategy(), proptest::option::of(1u16..65535))
        .prop_map(|(host, port)| match port {
            Some(port) => format!("{host}..{port}"),
            None => host,
        })
}

/// Strategy for generating short lists of registries.
fn registry_list_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(registry_strategy(), 0..6)
}

proptest! {
    #[test]
    fn folder_name_never_contains_port_escape(registry in registry_with_port_strategy()) {
        let folder = folder_name(&registry);
        prop_assert!(!folder.contains(".."));
        prop_assert_eq!(folder.len() + usize::from(folder.contains(':')), registry.len());
    }

    #[test]
    fn folder_name_without_escape_is_identity(registry in registry_strategy()) {
        prop_assert_eq!(folder_name(&registry), registry);
    }

    #[test]
    fn index_matches_sequence(
        first in registry_list_strategy(),
        second in registry_list_strategy(),
    ) {
        let mut model = ConfigModel::default();
        for registry in &first {
            model.set_mirrors(registry, vec![format!("mirror.local/{registry}")]);
        }
        model.apply_registry_policy(&[], &second, &first).unwrap();

        for entry in model.registries.entries() {
            let found = model.registries.get(entry.location()).map(RegistryEntry::location);
            prop_assert_eq!(found, Some(entry.location()));
        }
        let mut locations: Vec<_> = model
            .registries
            .entries()
            .iter()
            .map(RegistryEntry::location)
            .collect();
        locations.sort_unstable();
        locations.dedup();
        prop_assert_eq!(locations.len(), model.registries.len());
    }

    #[test]
    fn reject_rules_track_blocked_registries(
        blocked in registry_list_strategy(),
        later_blocked in registry_list_strategy(),
    ) {
        let mut model = ConfigModel::default();
        model.apply_registry_policy(&[], &blocked, &[]).unwrap();
        model.apply_registry_policy(&[], &later_blocked, &[]).unwrap();

        for entry in model.registries.entries() {
            prop_assert_eq!(
                entry.blocked() == Some(true),
                model.policy.is_rejected(entry.location())
            );
        }
        for rejected in model.policy.rejected_registries() {
            prop_assert_eq!(
                model.registries.get(rejected).and_then(RegistryEntry::blocked),
                Some(true)
            );
        }
    }

    #[test]
    fn allowed_and_blocked_never_coexist(
        allowed in registry_list_strategy(),
        blocked in registry_list_strategy(),
    ) {
        let mut model = ConfigModel::default();
        let _ = model.apply_registry_policy(&allowed, &blocked, &[]);
        prop_assert!(!model.registries.has_allowed_and_blocked());
    }
}
