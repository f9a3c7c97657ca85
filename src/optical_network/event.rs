use std::fmt::Display;

use crate::dsa::event_queue::{SchedulerError, TimedQueue};
use super::flow_generator::DemandId;

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum EventKind {
    SimulationStart,
    Arrival,
    Departure,
    SimulationEnd,
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Event {
    pub kind:EventKind,
    pub time:f64,
    pub demand:Option<DemandId>,
}

impl Event {
    pub fn start() -> Self {
        Self {kind:EventKind::SimulationStart,time:0.0,demand:None}
    }
    pub fn end(time:f64) -> Self {
        Self {kind:EventKind::SimulationEnd,time,demand:None}
    }
    pub fn arrival(time:f64,demand:DemandId) -> Self {
        Self {kind:EventKind::Arrival,time,demand:Some(demand)}
    }
    pub fn departure(time:f64,demand:DemandId) -> Self {
        Self {kind:EventKind::Departure,time,demand:Some(demand)}
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.demand {
            Some(demand) => write!(f,"{:?} of demand {} at {:.4}",self.kind,demand,self.time),
            None => write!(f,"{:?} at {:.4}",self.kind,self.time)
        }
    }
}

// pending events, earliest first, equal timestamps in insertion order
#[derive(Default)]
pub struct EventScheduler {
    queue:TimedQueue<Event>,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self {queue:TimedQueue::new()}
    }
    pub fn with_capacity(capacity:usize) -> Self {
        Self {queue:TimedQueue::with_capacity(capacity)}
    }
    pub fn insert(&mut self,event:Event) -> Result<(),SchedulerError> {
        self.queue.push(event.time, event)
    }
    pub fn pop_earliest(&mut self) -> Option<Event> {
        self.queue.pop().map(|(_,event)| event)
    }
    pub fn count(&self) -> usize {
        self.queue.len()
    }
    pub fn now(&self) -> f64 {
        self.queue.dispatched()
    }
}
