//! Per-agent memory that survives between ticks.
//!
//! Entries are addressed by a 32-bit key hash (usually [`crate::hash32`] of a name).
//! Each agent only ever holds a handful of live keys, so every table is a small vector
//! searched linearly rather than a hash map.
//!
//! Reading a key that was never written yields the zero value of its type.
//! Control nodes rely on this: a repeat counter or a wait timer starts at zero simply
//! because nothing was stored yet.

use serde::{Deserialize, Serialize};

pub type Vec3 = [f32; 3];

/// Handle of another simulation entity stored in a blackboard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef(pub u64);

impl EntityRef {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub key_hash: i32,
    pub value: T,
}

/// One typed table of the blackboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { entries: vec![] }
    }
}

impl<T: Copy + Default> Table<T> {
    pub fn try_get(&self, key_hash: i32) -> Option<T> {
        self.entries
            .iter()
            .find(|entry| entry.key_hash == key_hash)
            .map(|entry| entry.value)
    }

    pub fn get(&self, key_hash: i32) -> T {
        self.try_get(key_hash).unwrap_or_default()
    }

    pub fn set(&mut self, key_hash: i32, value: T) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.key_hash == key_hash)
        {
            entry.value = value;
        } else {
            self.entries.push(Entry { key_hash, value });
        }
    }

    pub fn remove(&mut self, key_hash: i32) -> bool {
        if let Some(i) = self
            .entries
            .iter()
            .position(|entry| entry.key_hash == key_hash)
        {
            self.entries.remove(i);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }
}

/// The blackboard of one agent.
///
/// The float table is the one the interpreter itself uses (repeat counters, wait
/// timers, interrupt flags, `SetBlackboard`/`ClearBlackboard` nodes).
/// The typed side tables are for actions that need richer payloads; a key hash only
/// has to be unique inside its own table.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blackboard {
    values: Table<f32>,
    bools: Table<bool>,
    ints: Table<i32>,
    vectors: Table<Vec3>,
    entities: Table<EntityRef>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key_hash: i32) -> f32 {
        self.values.get(key_hash)
    }

    pub fn try_get(&self, key_hash: i32) -> Option<f32> {
        self.values.try_get(key_hash)
    }

    pub fn set(&mut self, key_hash: i32, value: f32) {
        self.values.set(key_hash, value)
    }

    /// Returns whether the key was present.
    pub fn remove(&mut self, key_hash: i32) -> bool {
        self.values.remove(key_hash)
    }

    /// Clears the float table. The typed tables are left alone; see [`Self::reset`].
    pub fn clear_all(&mut self) {
        self.values.clear()
    }

    /// Clears every table.
    pub fn reset(&mut self) {
        self.values.clear();
        self.bools.clear();
        self.ints.clear();
        self.vectors.clear();
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<f32>> {
        self.values.iter()
    }

    pub fn get_bool(&self, key_hash: i32) -> bool {
        self.bools.get(key_hash)
    }

    pub fn set_bool(&mut self, key_hash: i32, value: bool) {
        self.bools.set(key_hash, value)
    }

    pub fn remove_bool(&mut self, key_hash: i32) -> bool {
        self.bools.remove(key_hash)
    }

    pub fn get_int(&self, key_hash: i32) -> i32 {
        self.ints.get(key_hash)
    }

    pub fn set_int(&mut self, key_hash: i32, value: i32) {
        self.ints.set(key_hash, value)
    }

    pub fn remove_int(&mut self, key_hash: i32) -> bool {
        self.ints.remove(key_hash)
    }

    pub fn get_vec3(&self, key_hash: i32) -> Vec3 {
        self.vectors.get(key_hash)
    }

    pub fn set_vec3(&mut self, key_hash: i32, value: Vec3) {
        self.vectors.set(key_hash, value)
    }

    pub fn remove_vec3(&mut self, key_hash: i32) -> bool {
        self.vectors.remove(key_hash)
    }

    pub fn get_entity(&self, key_hash: i32) -> EntityRef {
        self.entities.get(key_hash)
    }

    pub fn set_entity(&mut self, key_hash: i32, value: EntityRef) {
        self.entities.set(key_hash, value)
    }

    pub fn remove_entity(&mut self, key_hash: i32) -> bool {
        self.entities.remove(key_hash)
    }

    pub fn bools(&self) -> &Table<bool> {
        &self.bools
    }

    pub fn ints(&self) -> &Table<i32> {
        &self.ints
    }

    pub fn vectors(&self) -> &Table<Vec3> {
        &self.vectors
    }

    pub fn entities(&self) -> &Table<EntityRef> {
        &self.entities
    }
}
