//! Add/remove operations over the ordered collections nested in documents.
//!
//! Lists are kept newest-first: new entries always land at index 0.

use uuid::Uuid;

use crate::database::models::{Comment, EducationEntry, ExperienceEntry, Like};

/// Entries identified by a key within their parent list
pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Like {
    fn key(&self) -> Uuid {
        self.user
    }
}

impl Keyed for Comment {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for ExperienceEntry {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for EducationEntry {
    fn key(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipError {
    AlreadyMember,
    NotMember,
}

pub fn contains<T: Keyed>(list: &[T], key: Uuid) -> bool {
    list.iter().any(|entry| entry.key() == key)
}

/// Prepend `entry` unless its key is already present; the list is untouched on failure.
pub fn insert_member<T: Keyed>(list: &mut Vec<T>, entry: T) -> Result<(), MembershipError> {
    if contains(list, entry.key()) {
        return Err(MembershipError::AlreadyMember);
    }
    list.insert(0, entry);
    Ok(())
}

/// Filter out every entry with `key`; the list is untouched when none exists.
pub fn remove_member<T: Keyed>(list: &mut Vec<T>, key: Uuid) -> Result<(), MembershipError> {
    if !contains(list, key) {
        return Err(MembershipError::NotMember);
    }
    list.retain(|entry| entry.key() != key);
    Ok(())
}

/// Identifier not used by any entry of `list`
pub fn fresh_id<T: Keyed>(list: &[T]) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if !contains(list, id) {
            return id;
        }
    }
}

/// Build an entry with a fresh id and put it at the front.
pub fn append<T: Keyed>(list: &mut Vec<T>, build: impl FnOnce(Uuid) -> T) -> Uuid {
    let id = fresh_id(list);
    list.insert(0, build(id));
    id
}

/// Drop the entry with `id`. An unknown id leaves the list as it was and is
/// not an error; the return value only reports whether anything was removed.
pub fn remove_by_id<T: Keyed>(list: &mut Vec<T>, id: Uuid) -> bool {
    let before = list.len();
    list.retain(|entry| entry.key() != id);
    list.len() != before
}
