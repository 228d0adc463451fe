//! Station identifier resolution.
//!
//! Users configure stations by canonical code ("ST-3685") or by the short
//! number on the station sign ("102"). Numbers are only a display label
//! upstream and have historically been reused, so a numeric token can match
//! several stations. That ambiguity is a first-class outcome here: it is
//! never collapsed to a "first match" guess, because a guess would silently
//! monitor the wrong station.

use crate::domain::{Station, StationCode, StationQuery};

/// Outcome of resolving one user-supplied station token against a
/// directory snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one station matches.
    Resolved(StationCode),
    /// A numeric token matches several stations; all candidate codes are
    /// returned so the caller can force explicit code entry.
    Ambiguous(Vec<StationCode>),
    /// Nothing in the directory matches.
    NotFound,
}

/// Resolve a query against a directory snapshot.
///
/// A code query only needs existence confirmation. A numeric query scans
/// the directory for matching display numbers: zero matches is `NotFound`,
/// one is `Resolved`, more than one is `Ambiguous` with every candidate.
pub fn resolve(query: &StationQuery, directory: &[Station]) -> Resolution {
    match query {
        StationQuery::Code(code) => {
            if directory.iter().any(|s| &s.code == code) {
                Resolution::Resolved(code.clone())
            } else {
                Resolution::NotFound
            }
        }
        StationQuery::Numeric(number) => {
            let mut candidates: Vec<StationCode> = directory
                .iter()
                .filter(|s| s.numeric_id == Some(*number))
                .map(|s| s.code.clone())
                .collect();
            candidates.dedup();

            match candidates.len() {
                0 => Resolution::NotFound,
                1 => Resolution::Resolved(candidates.remove(0)),
                _ => Resolution::Ambiguous(candidates),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn station(code: &str, numeric_id: Option<u32>) -> Station {
        Station {
            code: StationCode::parse(code).unwrap(),
            numeric_id,
            name: format!("station {code}"),
            lat: 37.5,
            lon: 127.0,
            bikes_total: 0,
            bikes_general: 0,
            bikes_sprout: 0,
            bikes_repair: 0,
        }
    }

    #[test]
    fn code_query_confirms_existence() {
        let directory = vec![station("ST-100", Some(100)), station("ST-200", Some(100))];

        assert_eq!(
            resolve(&StationQuery::parse("ST-100").unwrap(), &directory),
            Resolution::Resolved(StationCode::parse("ST-100").unwrap())
        );
        assert_eq!(
            resolve(&StationQuery::parse("ST-999").unwrap(), &directory),
            Resolution::NotFound
        );
    }

    #[test]
    fn duplicated_number_is_ambiguous_with_all_candidates() {
        let directory = vec![station("ST-100", Some(100)), station("ST-200", Some(100))];

        let resolution = resolve(&StationQuery::parse("100").unwrap(), &directory);
        assert_eq!(
            resolution,
            Resolution::Ambiguous(vec![
                StationCode::parse("ST-100").unwrap(),
                StationCode::parse("ST-200").unwrap(),
            ])
        );
    }

    #[test]
    fn unique_number_resolves() {
        let directory = vec![station("ST-1", Some(1)), station("ST-2", Some(2))];

        assert_eq!(
            resolve(&StationQuery::Numeric(2), &directory),
            Resolution::Resolved(StationCode::parse("ST-2").unwrap())
        );
    }

    #[test]
    fn unknown_number_is_not_found() {
        let directory = vec![station("ST-1", Some(1))];
        assert_eq!(resolve(&StationQuery::Numeric(7), &directory), Resolution::NotFound);
    }

    #[test]
    fn stations_without_numbers_never_match_numeric_queries() {
        let directory = vec![station("ST-1", None)];
        assert_eq!(resolve(&StationQuery::Numeric(1), &directory), Resolution::NotFound);
    }

    proptest! {
        /// Directories with unique display numbers always resolve a matching
        /// numeric query to exactly one code.
        #[test]
        fn unique_numbers_always_resolve(ids in proptest::collection::hash_set(1u32..10_000, 1..50)) {
            let ids: Vec<u32> = ids.into_iter().collect();
            let directory: Vec<Station> = ids
                .iter()
                .map(|id| station(&format!("ST-{id}"), Some(*id)))
                .collect();

            for id in &ids {
                let resolution = resolve(&StationQuery::Numeric(*id), &directory);
                prop_assert_eq!(
                    resolution,
                    Resolution::Resolved(StationCode::parse(&format!("ST-{id}")).unwrap())
                );
            }
        }

        /// Any number shared by two or more stations yields Ambiguous with
        /// every matching code, never a guessed single result.
        #[test]
        fn shared_numbers_are_always_ambiguous(
            shared in 1u32..10_000,
            dup_count in 2usize..6,
            extra in proptest::collection::hash_set(10_000u32..20_000, 0..10),
        ) {
            let mut directory: Vec<Station> = (0..dup_count)
                .map(|i| station(&format!("ST-{}", 90_000 + i), Some(shared)))
                .collect();
            directory.extend(extra.iter().map(|id| station(&format!("ST-{id}"), Some(*id))));

            match resolve(&StationQuery::Numeric(shared), &directory) {
                Resolution::Ambiguous(candidates) => {
                    prop_assert_eq!(candidates.len(), dup_count);
                }
                other => prop_assert!(false, "expected Ambiguous, got {:?}", other),
            }
        }
    }
}
