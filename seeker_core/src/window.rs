//! Fixed-capacity sample windows.
//!
//! Two concrete windows share the same shape: a strict FIFO of at most
//! `capacity` samples, a frequency table covering exactly the samples currently
//! held, and a cached mode. Offsets are summarized by their median; presence
//! flags by their mode.
//!
//! The cached mode is kept exact across evictions: when the evicted sample was
//! the mode, the mode is re-derived from the remaining samples. Ties keep the
//! current mode.

use std::collections::{HashMap, VecDeque};

/// Frequency-table key for an `f64`. Folds `-0.0` into `0.0` and all NaNs into one key.
#[inline]
fn freq_key(v: f64) -> u64 {
    if v == 0.0 {
        0.0_f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

/// History of one continuous offset signal.
#[derive(Debug, Clone)]
pub struct OffsetWindow {
    capacity: usize,
    samples: VecDeque<f64>,
    counts: HashMap<u64, usize>,
    mode: Option<f64>,
}

impl OffsetWindow {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            counts: HashMap::with_capacity(capacity),
            mode: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    fn count_of(&self, v: f64) -> usize {
        self.counts.get(&freq_key(v)).copied().unwrap_or(0)
    }

    /// Append `value`, evicting the oldest sample first when full.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() >= self.capacity {
            self.evict_oldest();
        }
        self.samples.push_back(value);
        let n = {
            let c = self.counts.entry(freq_key(value)).or_insert(0);
            *c += 1;
            *c
        };
        match self.mode {
            Some(m) if n <= self.count_of(m) => {}
            _ => self.mode = Some(value),
        }
    }

    /// Remove and return the oldest sample.
    pub fn evict_oldest(&mut self) -> Option<f64> {
        let old = self.samples.pop_front()?;
        let key = freq_key(old);
        if let Some(c) = self.counts.get_mut(&key) {
            *c -= 1;
            if *c == 0 {
                self.counts.remove(&key);
            }
        }
        if self.mode.map(freq_key) == Some(key) {
            self.rescan_mode();
        }
        Some(old)
    }

    /// The current mode keeps ties; otherwise the oldest sample wins, so the
    /// result does not depend on hash order.
    fn rescan_mode(&mut self) {
        let mut best: Option<(f64, usize)> = self
            .mode
            .map(|m| (m, self.count_of(m)))
            .filter(|&(_, n)| n > 0);
        for v in self.samples.iter().copied() {
            let n = self.count_of(v);
            if best.is_none_or(|(_, bn)| n > bn) {
                best = Some((v, n));
            }
        }
        self.mode = best.map(|(v, _)| v);
    }

    /// Most frequent value currently in the window.
    pub fn mode(&self) -> Option<f64> {
        self.mode
    }

    /// Middle element of a sorted copy; the upper middle for even lengths.
    pub fn median(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_unstable_by(f64::total_cmp);
        Some(sorted[sorted.len() / 2])
    }

    /// Window summary used by the controller: the median.
    ///
    /// # Panics
    /// When the window is empty. Querying before the first push is a lifecycle bug.
    pub fn average(&self) -> f64 {
        match self.median() {
            Some(m) => m,
            None => panic!("OffsetWindow::average called on an empty window"),
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.counts.clear();
        self.mode = None;
    }

    /// Sum of frequency-table counts; always equals `len()`.
    pub fn counted(&self) -> usize {
        self.counts.values().sum()
    }
}

/// History of the target-presence flag.
#[derive(Debug, Clone)]
pub struct PresenceWindow {
    capacity: usize,
    samples: VecDeque<bool>,
    present: usize,
    absent: usize,
    mode: Option<bool>,
}

impl PresenceWindow {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            present: 0,
            absent: 0,
            mode: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    fn count_of(&self, v: bool) -> usize {
        if v { self.present } else { self.absent }
    }

    pub fn push(&mut self, value: bool) {
        if self.samples.len() >= self.capacity {
            self.evict_oldest();
        }
        self.samples.push_back(value);
        if value {
            self.present += 1;
        } else {
            self.absent += 1;
        }
        match self.mode {
            Some(m) if self.count_of(value) <= self.count_of(m) => {}
            _ => self.mode = Some(value),
        }
    }

    pub fn evict_oldest(&mut self) -> Option<bool> {
        let old = self.samples.pop_front()?;
        if old {
            self.present -= 1;
        } else {
            self.absent -= 1;
        }
        if self.samples.is_empty() {
            self.mode = None;
        } else if self.mode == Some(old) && self.count_of(!old) > self.count_of(old) {
            self.mode = Some(!old);
        }
        Some(old)
    }

    pub fn mode(&self) -> Option<bool> {
        self.mode
    }

    /// Majority presence over the window.
    ///
    /// # Panics
    /// When the window is empty.
    pub fn average(&self) -> bool {
        match self.mode {
            Some(m) => m,
            None => panic!("PresenceWindow::average called on an empty window"),
        }
    }

    pub fn present(&self) -> usize {
        self.present
    }

    pub fn absent(&self) -> usize {
        self.absent
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.present = 0;
        self.absent = 0;
        self.mode = None;
    }
}
