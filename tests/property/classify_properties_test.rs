//! Property-based tests for record classification.

use popup_bookmarks::types::bookmark::{
    classify, BookmarkKind, BookmarkRecord, PLACEHOLDER_ID_PREFIX, ROOT_ID, SEPARATOR_URL,
};
use proptest::prelude::*;

fn arb_url() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        "[a-z]{1,8}".prop_map(|host| Some(format!("https://{}.example", host))),
        "[a-z0-9]{0,6}".prop_map(|rest| Some(format!("{}{}", SEPARATOR_URL, rest))),
        "[a-z]{0,8}".prop_map(|code| Some(format!("javascript:{}", code))),
    ]
}

fn arb_record() -> impl Strategy<Value = BookmarkRecord> {
    (
        "[0-9]{1,4}",
        prop_oneof![Just(None), Just(Some(ROOT_ID.to_string())), "[1-9][0-9]{0,3}".prop_map(Some)],
        "[a-zA-Z ]{0,12}",
        arb_url(),
        0usize..50,
    )
        .prop_map(|(id, parent_id, title, url, index)| BookmarkRecord {
            id,
            parent_id,
            title,
            url,
            index,
            date_added: 0,
            date_group_modified: None,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn classification_ignores_title_index_and_dates(record in arb_record(), title in "[a-z]{0,8}", index in 0usize..99) {
        let mut other = record.clone();
        other.title = title;
        other.index = index;
        other.date_added = 1_700_000_000_000;
        other.date_group_modified = Some(1);
        prop_assert_eq!(classify(&record), classify(&other));
        prop_assert_eq!(record.kind(), classify(&record));
    }

    #[test]
    fn children_of_root_are_root_folders(mut record in arb_record()) {
        record.parent_id = Some(ROOT_ID.to_string());
        prop_assert_eq!(classify(&record), BookmarkKind::RootFolder);
        prop_assert!(record.is_openable());
    }

    #[test]
    fn kind_follows_url(mut record in arb_record()) {
        prop_assume!(record.parent_id.as_deref() != Some(ROOT_ID));
        let expected = match record.url.as_deref() {
            None => BookmarkKind::Folder,
            Some(url) if url.starts_with(SEPARATOR_URL) => BookmarkKind::Separator,
            Some(_) => BookmarkKind::Bookmark,
        };
        prop_assert_eq!(classify(&record), expected);

        record.id = format!("{}{}", PLACEHOLDER_ID_PREFIX, record.id);
        prop_assert_eq!(classify(&record), BookmarkKind::Placeholder);
    }

    #[test]
    fn only_bookmarks_are_listed_in_search(record in arb_record()) {
        let kind = classify(&record);
        prop_assert_eq!(kind.is_listable_in_search(), kind == BookmarkKind::Bookmark);
        prop_assert!(!(kind.is_listable_in_search() && kind.is_openable()));
    }
}
