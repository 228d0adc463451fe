//! Favorite-station reconciliation.
//!
//! Favorites are managed on the upstream account, not locally, so the set
//! of favorite-station entities has to follow whatever the latest fetch
//! returned. Reconciliation is a pure set difference between the fetched
//! favorites and the codes that currently have entities; the resulting
//! delta is applied through the entity registry by the caller.

use std::collections::BTreeSet;

use crate::domain::StationCode;

/// Entity changes needed to make the registered set match a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesDelta {
    /// Codes favorite upstream but with no entity yet.
    pub to_add: BTreeSet<StationCode>,
    /// Codes with an entity but no longer favorite upstream.
    pub to_remove: BTreeSet<StationCode>,
}

impl FavoritesDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff a fetched favorite set against the currently registered set.
///
/// Order-independent and idempotent: applying the delta and reconciling
/// again yields an empty delta. Entities in both sets are untouched.
pub fn reconcile(
    fetched: &BTreeSet<StationCode>,
    registered: &BTreeSet<StationCode>,
) -> FavoritesDelta {
    FavoritesDelta {
        to_add: fetched.difference(registered).cloned().collect(),
        to_remove: registered.difference(fetched).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codes(items: &[&str]) -> BTreeSet<StationCode> {
        items.iter().map(|c| StationCode::parse(c).unwrap()).collect()
    }

    #[test]
    fn delta_is_plain_set_difference() {
        let registered = codes(&["ST-1", "ST-2"]);
        let fetched = codes(&["ST-2", "ST-3"]);

        let delta = reconcile(&fetched, &registered);
        assert_eq!(delta.to_add, codes(&["ST-3"]));
        assert_eq!(delta.to_remove, codes(&["ST-1"]));
    }

    #[test]
    fn identical_sets_yield_empty_delta() {
        let set = codes(&["ST-1", "ST-2", "ST-3"]);
        assert!(reconcile(&set, &set).is_empty());
    }

    #[test]
    fn empty_registered_set_adds_everything() {
        let fetched = codes(&["ST-5", "ST-9"]);
        let delta = reconcile(&fetched, &BTreeSet::new());
        assert_eq!(delta.to_add, fetched);
        assert!(delta.to_remove.is_empty());
    }

    #[test]
    fn empty_fetch_removes_everything() {
        let registered = codes(&["ST-5", "ST-9"]);
        let delta = reconcile(&BTreeSet::new(), &registered);
        assert!(delta.to_add.is_empty());
        assert_eq!(delta.to_remove, registered);
    }

    fn arb_codes() -> impl Strategy<Value = BTreeSet<StationCode>> {
        proptest::collection::btree_set(1u32..500, 0..40).prop_map(|ids| {
            ids.into_iter()
                .map(|id| StationCode::parse(&format!("ST-{id}")).unwrap())
                .collect()
        })
    }

    proptest! {
        /// Applying a delta and reconciling again is a fixed point.
        #[test]
        fn reconcile_is_idempotent(fetched in arb_codes(), registered in arb_codes()) {
            let delta = reconcile(&fetched, &registered);

            let mut applied = registered.clone();
            applied.extend(delta.to_add.iter().cloned());
            applied.retain(|code| !delta.to_remove.contains(code));

            prop_assert_eq!(&applied, &fetched);
            prop_assert!(reconcile(&fetched, &applied).is_empty());
        }

        /// The delta never touches codes present in both sets.
        #[test]
        fn unchanged_codes_are_untouched(fetched in arb_codes(), registered in arb_codes()) {
            let delta = reconcile(&fetched, &registered);
            for code in fetched.intersection(&registered) {
                prop_assert!(!delta.to_add.contains(code));
                prop_assert!(!delta.to_remove.contains(code));
            }
        }
    }
}
