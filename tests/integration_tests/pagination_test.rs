//! Property tests for the query helpers

use iptv_sweep::models::Channel;
use iptv_sweep::storage::{paginate, search};
use proptest::prelude::*;

fn records(names: &[String]) -> Vec<Channel> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| Channel::new(n.clone(), format!("http://example.com/{i}")))
        .collect()
}

proptest! {
    #[test]
    fn pages_partition_records(
        names in prop::collection::vec("[a-zA-Z ]{0,12}", 0..120),
        page_size in 1usize..40,
    ) {
        let all = records(&names);
        let pages = all.len().div_ceil(page_size);

        let mut joined = Vec::new();
        for page in 1..=pages {
            let chunk = paginate(&all, page, page_size);
            prop_assert!(!chunk.is_empty());
            prop_assert!(chunk.len() <= page_size);
            joined.extend_from_slice(chunk);
        }

        prop_assert_eq!(joined, all.clone());
        prop_assert!(paginate(&all, pages + 1, page_size).is_empty());
        prop_assert!(paginate(&all, 0, page_size).is_empty());
    }

    #[test]
    fn search_matches_ignore_case(
        names in prop::collection::vec("[a-zA-Z]{1,10}", 0..60),
        query in "[a-zA-Z]{0,3}",
    ) {
        let all = records(&names);
        let found = search(&all, &query);
        let needle = query.to_lowercase();

        prop_assert!(found.iter().all(|c| c.name.to_lowercase().contains(&needle)));
        let expected = all
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(found.len(), expected);
    }
}
