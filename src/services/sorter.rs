//! Sort-by-name for a folder's children.
//!
//! Children are split into runs at every separator; each separator leads
//! the run it starts. Inside a run the order is separator, folders,
//! bookmarks, with folders and bookmarks ordered by title collation.
//! Ties keep their original relative order.

use std::cmp::Ordering;

use feruca::Collator;
use serde::{Deserialize, Serialize};

use crate::types::bookmark::{BookmarkKind, BookmarkRecord};

/// One store move needed to realize a new sibling order.
///
/// `index` uses the store's convention: when an item moves forward within
/// its parent, the index is interpreted before the item is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInstruction {
    pub id: String,
    pub index: usize,
}

#[derive(Default)]
struct Run {
    separators: Vec<BookmarkRecord>,
    folders: Vec<BookmarkRecord>,
    bookmarks: Vec<BookmarkRecord>,
}

/// Compares two titles with the CLDR root collation (accents and case
/// only break ties), then by code point so the order is total.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collate(&mut Collator::default(), a, b)
}

fn collate(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

/// Stable sort by title collation.
pub fn sort_by_title(mut records: Vec<BookmarkRecord>) -> Vec<BookmarkRecord> {
    let mut collator = Collator::default();
    records.sort_by(|a, b| collate(&mut collator, &a.title, &b.title));
    records
}

/// Produces the sorted order of `children` without touching the store.
pub fn sort_siblings(children: &[BookmarkRecord]) -> Vec<BookmarkRecord> {
    let mut runs = vec![Run::default()];

    for child in children {
        if child.kind() == BookmarkKind::Separator {
            runs.push(Run::default());
        }
        let Some(run) = runs.last_mut() else {
            continue;
        };
        match child.kind() {
            BookmarkKind::Separator => run.separators.push(child.clone()),
            BookmarkKind::Folder | BookmarkKind::RootFolder => run.folders.push(child.clone()),
            BookmarkKind::Bookmark | BookmarkKind::Placeholder => run.bookmarks.push(child.clone()),
        }
    }

    let mut sorted = Vec::with_capacity(children.len());
    for run in runs {
        sorted.extend(run.separators);
        sorted.extend(sort_by_title(run.folders));
        sorted.extend(sort_by_title(run.bookmarks));
    }
    sorted
}

/// Moves that turn `old` into `new`, to be replayed in order.
///
/// Positions are settled from the front: at step `i` every position before
/// `i` already holds its final record, so each move relocates one record
/// into slot `i` of the working copy.
pub fn reindex_moves(old: &[BookmarkRecord], new: &[BookmarkRecord]) -> Vec<MoveInstruction> {
    let mut working: Vec<&str> = old.iter().map(|record| record.id.as_str()).collect();
    let mut moves = Vec::new();

    for (target, record) in new.iter().enumerate() {
        let Some(current) = working.iter().position(|id| *id == record.id) else {
            continue;
        };
        if current == target {
            continue;
        }

        let id = working.remove(current);
        let target = target.min(working.len());
        working.insert(target, id);

        let index = if target > current { target + 1 } else { target };
        moves.push(MoveInstruction {
            id: id.to_string(),
            index,
        });
    }
    moves
}

/// Replays moves over an id list with the store's index convention.
pub fn apply_moves(old_ids: &[String], moves: &[MoveInstruction]) -> Vec<String> {
    let mut ids = old_ids.to_vec();
    for instruction in moves {
        let Some(current) = ids.iter().position(|id| *id == instruction.id) else {
            continue;
        };
        let mut target = instruction.index.min(ids.len());
        if target > current {
            target -= 1;
        }
        let id = ids.remove(current);
        ids.insert(target.min(ids.len()), id);
    }
    ids
}
