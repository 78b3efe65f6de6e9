//! Per-instance history slots in the circuit state vectors.
//!
//! The driver keeps three snapshots of one flat vector: the current
//! iteration and the two previous accepted time points. Each device
//! instance owns a contiguous run of slots in all three.

/// A named field inside a device's run of state slots.
pub trait StateField: Copy {
    /// Number of fields in the run.
    const COUNT: usize;

    fn offset(self) -> usize;
}

/// Which snapshot of the state vector to access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    /// state0: the iteration being computed.
    Current,
    /// state1: the last accepted time point.
    Previous,
    /// state2: the time point before that.
    BeforePrevious,
}

/// Base of a device instance's slot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSlot {
    pub base: usize,
}

impl StateSlot {
    pub fn index<F: StateField>(self, field: F) -> usize {
        self.base + field.offset()
    }
}

/// Hands out consecutive slot runs during setup.
#[derive(Debug, Default)]
pub struct StateAllocator {
    next: usize,
}

impl StateAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, width: usize) -> StateSlot {
        let slot = StateSlot { base: self.next };
        self.next += width;
        slot
    }

    /// Total slots handed out.
    pub fn len(&self) -> usize {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }
}

#[derive(Debug, Clone)]
pub struct StateHistory {
    current: Vec<f64>,
    previous: Vec<f64>,
    before_previous: Vec<f64>,
}

impl StateHistory {
    pub fn new(len: usize) -> Self {
        Self {
            current: vec![0.0; len],
            previous: vec![0.0; len],
            before_previous: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn vector(&self, which: History) -> &[f64] {
        match which {
            History::Current => &self.current,
            History::Previous => &self.previous,
            History::BeforePrevious => &self.before_previous,
        }
    }

    pub fn vector_mut(&mut self, which: History) -> &mut [f64] {
        match which {
            History::Current => &mut self.current,
            History::Previous => &mut self.previous,
            History::BeforePrevious => &mut self.before_previous,
        }
    }

    pub fn get<F: StateField>(&self, which: History, slot: StateSlot, field: F) -> f64 {
        self.vector(which)[slot.index(field)]
    }

    pub fn set<F: StateField>(&mut self, which: History, slot: StateSlot, field: F, value: f64) {
        self.vector_mut(which)[slot.index(field)] = value;
    }

    /// Copy a field from state0 into state1.
    pub fn copy_current_to_previous<F: StateField>(&mut self, slot: StateSlot, field: F) {
        let i = slot.index(field);
        self.previous[i] = self.current[i];
    }

    /// Accept the current time point: state2 <- state1 <- state0.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.before_previous, &mut self.previous);
        self.previous.copy_from_slice(&self.current);
    }
}
