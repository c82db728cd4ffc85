use super::*;

mod navigation_guard;
mod page_lifecycle;

fn shared_store(entries: &[(&str, &str)]) -> SharedStore {
    SharedStore::new(MemoryStore::with_entries(entries))
}

fn respondent_store() -> SharedStore {
    shared_store(&[(USER_ID_KEY, "u-100"), (SESSION_KEY, "s-1")])
}
