use thiserror::Error;

use crate::dsa::event_queue::SchedulerError;
use crate::scientific_computing::statistics::BlockingStats;
use super::control_plane::ControlPlane;
use super::event::{Event, EventKind, EventScheduler};
use super::flow_generator::{Demand, DemandId, demand_events};
use super::topology::TopologyError;

#[derive(Error,Debug)]
pub enum SimulationError {
    #[error("Resource invariant broken: {0}")]
    Invariant(#[from] TopologyError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("Demand {0} arrived twice")]
    DuplicateArrival(DemandId),
    #[error("{kind:?} event at {time} carries no demand")]
    MissingDemand{kind:EventKind,time:f64},
    #[error("Demand {0} is not known to the simulation")]
    UnknownDemand(DemandId),
    #[error("Expected demand id {expected} but found {found}, demand ids must be dense and start at 0")]
    DemandIdOutOfOrder{expected:DemandId,found:DemandId},
}

type Result<T> = std::result::Result<T,SimulationError>;

// pops events in time order and hands each to the control plane
pub struct Simulator {
    control:ControlPlane,
    scheduler:EventScheduler,
    demands:Vec<Demand>,
    scheduled:usize,
    consumed:usize,
    next_report:u8,
}

impl Simulator {
    // queues a start event, both events of every demand, and an end event after the last departure
    pub fn new(control:ControlPlane,demands:Vec<Demand>) -> Result<Self> {
        for (expected,demand) in demands.iter().enumerate() {
            if demand.id != expected {
                return Err(SimulationError::DemandIdOutOfOrder{expected,found:demand.id});
            }
        }
        let events = demand_events(&demands);
        let mut simulator = Self {
            control,
            scheduler:EventScheduler::with_capacity(events.len() + 2),
            demands,
            scheduled:0,
            consumed:0,
            next_report:10,
        };
        let end = simulator.demands.iter().map(|demand| demand.departure).fold(0.0, f64::max);
        simulator.schedule(Event::start())?;
        for event in events {
            simulator.schedule(event)?;
        }
        simulator.schedule(Event::end(end))?;
        Ok(simulator)
    }

    pub fn schedule(&mut self,event:Event) -> Result<()> {
        self.scheduler.insert(event)?;
        self.scheduled += 1;
        Ok(())
    }

    pub fn control_plane(&self) -> &ControlPlane {
        &self.control
    }
    pub fn stats(&self) -> &BlockingStats {
        self.control.stats()
    }
    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }
    pub fn pending(&self) -> usize {
        self.scheduler.count()
    }
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    fn dispatch(&mut self,event:&Event) -> Result<()> {
        let demand = match event.demand {
            Some(id) => Some(self.demands.get(id).ok_or(SimulationError::UnknownDemand(id))?),
            None => None,
        };
        self.control.handle_event(event, demand)
    }

    pub fn run(&mut self) -> Result<()> {
        self.run_with_progress(|_| {})
    }

    // observer sees 10, 20, ... 100, each once and in order
    pub fn run_with_progress(&mut self,mut observer:impl FnMut(u8)) -> Result<()> {
        while let Some(event) = self.scheduler.pop_earliest() {
            if let Err(err) = self.dispatch(&event) {
                log::error!("simulation aborted while handling {event}: {err}");
                return Err(err);
            }
            self.consumed += 1;
            let percent = (self.consumed*100/self.scheduled.max(1)).min(100);
            while usize::from(self.next_report) <= percent {
                log::info!("progress {}%",self.next_report);
                observer(self.next_report);
                self.next_report += 10;
            }
        }
        Ok(())
    }
}
