//! `NameTable` — a string interner producing dense typed ids.
//!
//! The event log names activities and resources with free-form strings.  The
//! engines work on dense integer ids so per-resource state can live in plain
//! `Vec`s; `NameTable` is the bridge in both directions.

use std::marker::PhantomData;

use rustc_hash::FxHashMap;

/// Interner mapping names to ids of type `I` (assigned in insertion order).
#[derive(Clone, Debug)]
pub struct NameTable<I> {
    names: Vec<String>,
    lookup: FxHashMap<String, u32>,
    _id: PhantomData<I>,
}

impl<I> Default for NameTable<I> {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            lookup: FxHashMap::default(),
            _id: PhantomData,
        }
    }
}

impl<I: From<u32> + Into<u32> + Copy> NameTable<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, assigning the next free id if unseen.
    pub fn intern(&mut self, name: &str) -> I {
        if let Some(&raw) = self.lookup.get(name) {
            return I::from(raw);
        }
        let raw = self.names.len() as u32;
        self.names.push(name.to_owned());
        self.lookup.insert(name.to_owned(), raw);
        I::from(raw)
    }

    /// Id of an existing name, or `None`.
    pub fn get(&self, name: &str) -> Option<I> {
        self.lookup.get(name).map(|&raw| I::from(raw))
    }

    /// Name for `id`, or `None` if the id was not issued by this table.
    pub fn name(&self, id: I) -> Option<&str> {
        self.names.get(id.into() as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (I::from(i as u32), n.as_str()))
    }
}

macro_rules! raw_conversions {
    ($($id:ty),*) => {$(
        impl From<u32> for $id {
            #[inline(always)]
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$id> for u32 {
            #[inline(always)]
            fn from(id: $id) -> u32 {
                id.0
            }
        }
    )*};
}

raw_conversions!(crate::ActivityId, crate::ResourceId, crate::CaseId);
