use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

#[derive(Error,Debug,Clone,Copy,PartialEq)]
pub enum SchedulerError {
    #[error("Event timestamp {0} is negative or not a number")]
    InvalidTimestamp(f64),
    #[error("Event timestamp {time} precedes the already dispatched time {dispatched}")]
    TimestampInPast{time:f64,dispatched:f64},
}

type Result<T> = std::result::Result<T,SchedulerError>;

struct Entry<T> {
    time:f64,
    // insertion counter, keeps equal timestamps FIFO
    seq:u64,
    item:T
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

// reversed, so the std max-heap pops the earliest entry
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// min-priority queue keyed on a time stamp, O(log n) push and pop
pub struct TimedQueue<T> {
    heap:BinaryHeap<Entry<T>>,
    next_seq:u64,
    dispatched:f64,
}

impl<T> Default for TimedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimedQueue<T> {
    pub fn new() -> Self {
        Self {heap:BinaryHeap::new(),next_seq:0,dispatched:0.0}
    }
    pub fn with_capacity(capacity:usize) -> Self {
        Self {heap:BinaryHeap::with_capacity(capacity),next_seq:0,dispatched:0.0}
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    // time of the last popped entry, 0 before the first pop
    pub fn dispatched(&self) -> f64 {
        self.dispatched
    }
    pub fn push(&mut self,time:f64,item:T) -> Result<()> {
        if time.is_nan() || time < 0.0 {
            return Err(SchedulerError::InvalidTimestamp(time));
        }
        if time < self.dispatched {
            return Err(SchedulerError::TimestampInPast{time,dispatched:self.dispatched});
        }
        self.heap.push(Entry {time,seq:self.next_seq,item});
        self.next_seq += 1;
        Ok(())
    }
    pub fn pop(&mut self) -> Option<(f64,T)> {
        let Entry {time,item,..} = self.heap.pop()?;
        debug_assert!(time >= self.dispatched);
        self.dispatched = time;
        Some((time,item))
    }
}
