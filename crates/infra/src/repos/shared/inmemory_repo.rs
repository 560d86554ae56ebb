use deadline_notifier_domain::{Entity, ID};
use std::sync::{Mutex, MutexGuard};

/// Useful functions for creating inmemory repositories

fn lock<T>(collection: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    // A panic while holding the lock leaves the data intact for these plain vectors
    collection
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = lock(collection);
    collection.push(val.clone());
}

/// Replaces the item with the same id, or inserts it if it does not exist
pub fn save<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = lock(collection);
    match collection.iter_mut().find(|item| item.id() == val.id()) {
        Some(item) => *item = val.clone(),
        None => collection.push(val.clone()),
    }
}

pub fn find<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = lock(collection);
    collection.iter().find(|item| item.id() == val_id).cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    let collection = lock(collection);
    collection.iter().filter(|item| compare(item)).cloned().collect()
}

pub fn delete<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let mut collection = lock(collection);
    let index = collection.iter().position(|item| item.id() == val_id)?;
    Some(collection.remove(index))
}

pub fn update_many<T, F: Fn(&T) -> bool, U: Fn(&mut T)>(
    collection: &Mutex<Vec<T>>,
    compare: F,
    update: U,
) -> usize {
    let mut collection = lock(collection);
    let mut updated = 0;
    for item in collection.iter_mut().filter(|item| compare(item)) {
        update(item);
        updated += 1;
    }
    updated
}

/// Inserts `val` unless `exists` matches an item already in the collection.
/// Returns the stored item.
pub fn insert_if_absent<T: Clone, F: Fn(&T) -> bool>(
    val: &T,
    collection: &Mutex<Vec<T>>,
    exists: F,
) -> T {
    let mut collection = lock(collection);
    match collection.iter().find(|item| exists(item)) {
        Some(existing) => existing.clone(),
        None => {
            collection.push(val.clone());
            val.clone()
        }
    }
}

/// Merges `val` into the item matched by `same`, or inserts it if there is none
pub fn upsert_by<T: Clone, F: Fn(&T) -> bool, M: Fn(&mut T, &T)>(
    val: &T,
    collection: &Mutex<Vec<T>>,
    same: F,
    merge: M,
) {
    let mut collection = lock(collection);
    match collection.iter_mut().find(|item| same(item)) {
        Some(item) => merge(item, val),
        None => collection.push(val.clone()),
    }
}
