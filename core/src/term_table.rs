use crate::error::IndexError;

#[derive(Debug, Clone)]
struct Slot {
    key: String,
    value: usize,
}

/// Open-addressing map from term to slot number, probed linearly.
///
/// Grows to twice its capacity before an insert would push the load factor
/// past `max_load`, so the probe cycle always has a free slot in practice.
#[derive(Debug, Clone)]
pub struct TermTable {
    slots: Vec<Option<Slot>>,
    len: usize,
    max_load: f64,
}

impl TermTable {
    pub fn with_capacity(capacity: usize, max_load: f64) -> Self {
        let max_load = if max_load > 0.0 && max_load <= 1.0 { max_load } else { 0.7 };
        Self { slots: vec![None; capacity.max(1)], len: 0, max_load }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn capacity(&self) -> usize { self.slots.len() }

    fn hash(key: &str) -> u64 {
        key.bytes().fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(b as u64))
    }

    fn home(&self, key: &str) -> usize {
        (Self::hash(key) % self.slots.len() as u64) as usize
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        let start = self.home(key);
        let mut idx = start;
        loop {
            match &self.slots[idx] {
                None => return None,
                Some(slot) if slot.key == key => return Some(slot.value),
                Some(_) => {}
            }
            idx = (idx + 1) % self.slots.len();
            if idx == start {
                return None;
            }
        }
    }

    /// Insert `key` unless present. Returns `Ok(false)` if the key already existed.
    pub fn insert(&mut self, key: String, value: usize) -> Result<bool, IndexError> {
        if (self.len + 1) as f64 > self.slots.len() as f64 * self.max_load {
            self.grow()?;
        }
        self.insert_slot(Slot { key, value })
    }

    fn insert_slot(&mut self, slot: Slot) -> Result<bool, IndexError> {
        let start = self.home(&slot.key);
        let mut idx = start;
        loop {
            match &self.slots[idx] {
                None => {
                    self.slots[idx] = Some(slot);
                    self.len += 1;
                    return Ok(true);
                }
                Some(existing) if existing.key == slot.key => return Ok(false),
                Some(_) => {}
            }
            idx = (idx + 1) % self.slots.len();
            if idx == start {
                return Err(IndexError::CapacityExhausted { capacity: self.slots.len(), key: slot.key });
            }
        }
    }

    fn grow(&mut self) -> Result<(), IndexError> {
        let new_capacity = self.slots.len() * 2;
        tracing::debug!(from = self.slots.len(), to = new_capacity, "rehashing term table");
        let old = std::mem::replace(&mut self.slots, vec![None; new_capacity]);
        self.len = 0;
        for slot in old.into_iter().flatten() {
            self.insert_slot(slot)?;
        }
        Ok(())
    }
}

impl Default for TermTable {
    fn default() -> Self { Self::with_capacity(1 << 16, 0.7) }
}
