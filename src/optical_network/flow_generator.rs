use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scientific_computing::distribution::Sampler;
use super::event::Event;
use super::topology::NodeId;

pub type DemandId = usize;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum TrafficError {
    #[error("At least two nodes are needed to draw demands, found {0}")]
    TooFewNodes(usize),
    #[error("No traffic class given")]
    NoClasses,
    #[error("Traffic class {class} has an invalid {field}: {value}")]
    InvalidClass{class:usize,field:&'static str,value:f64},
    #[error("Invalid {field}: {value}")]
    InvalidValue{field:&'static str,value:f64},
}

type Result<T> = std::result::Result<T,TrafficError>;

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct TrafficClass {
    // relative share of demands drawn from this class
    pub weight:f64,
    pub holding_time:f64,
    // Gb/s
    pub rate:f64,
}

#[derive(Clone,Debug,PartialEq)]
pub struct Demand {
    pub id:DemandId,
    pub source:NodeId,
    pub destination:NodeId,
    pub rate:f64,
    pub holding_time:f64,
    pub arrival:f64,
    pub departure:f64,
}

fn positive(value:f64) -> bool {
    value.is_finite() && value > 0.0
}

pub struct FlowGenerator<S:Sampler> {
    nodes:usize,
    classes:Vec<TrafficClass>,
    weights:Vec<f64>,
    demands:usize,
    load:f64,
    max_rate:f64,
    sampler:S,
}

impl<S:Sampler> FlowGenerator<S> {
    pub fn new(nodes:usize,classes:Vec<TrafficClass>,demands:usize,load:f64,max_rate:f64,sampler:S) -> Result<Self> {
        if nodes < 2 {
            return Err(TrafficError::TooFewNodes(nodes));
        }
        if classes.is_empty() {
            return Err(TrafficError::NoClasses);
        }
        for (class,traffic) in classes.iter().enumerate() {
            for (field,value) in [("weight",traffic.weight),("holding time",traffic.holding_time),("rate",traffic.rate)] {
                if !positive(value) {
                    return Err(TrafficError::InvalidClass{class,field,value});
                }
            }
        }
        for (field,value) in [("load",load),("max rate",max_rate)] {
            if !positive(value) {
                return Err(TrafficError::InvalidValue{field,value});
            }
        }
        let weights = classes.iter().map(|class| class.weight).collect();
        Ok(Self {nodes,classes,weights,demands,load,max_rate,sampler})
    }

    fn weighted_mean(&self,value:impl Fn(&TrafficClass) -> f64) -> f64 {
        let total:f64 = self.weights.iter().sum();
        self.classes.iter().map(|class| class.weight*value(class)).sum::<f64>()/total
    }
    pub fn mean_holding_time(&self) -> f64 {
        self.weighted_mean(|class| class.holding_time)
    }
    pub fn mean_rate(&self) -> f64 {
        self.weighted_mean(|class| class.rate)
    }
    // offered load in Erlangs scaled by how much of max rate an average demand uses
    pub fn mean_inter_arrival(&self) -> f64 {
        self.mean_holding_time()*(self.mean_rate()/self.max_rate)/self.load
    }

    // same sampler state, same demands
    pub fn generate(&mut self) -> Vec<Demand> {
        let inter_arrival = self.mean_inter_arrival();
        let mut demands = Vec::with_capacity(self.demands);
        let mut now = 0.0;
        for id in 0..self.demands {
            now += self.sampler.exponential(inter_arrival);
            let class = self.sampler.weighted_index(&self.weights).unwrap_or(0);
            let Some((source,destination)) = self.sampler.distinct_pair(self.nodes) else {
                break;
            };
            let class = &self.classes[class];
            let holding_time = self.sampler.exponential(class.holding_time);
            demands.push(Demand {
                id,source,destination,
                rate:class.rate,
                holding_time,
                arrival:now,
                departure:now + holding_time,
            });
        }
        demands
    }
}

// one arrival and one departure per demand
pub fn demand_events(demands:&[Demand]) -> Vec<Event> {
    let mut events = Vec::with_capacity(demands.len()*2);
    for demand in demands {
        events.push(Event::arrival(demand.arrival, demand.id));
        events.push(Event::departure(demand.departure, demand.id));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::{FlowGenerator, TrafficClass, TrafficError, demand_events};
    use crate::optical_network::event::EventKind;
    use crate::scientific_computing::distribution::SeededSampler;

    fn classes() -> Vec<TrafficClass> {
        vec![
            TrafficClass {weight:3.0,holding_time:2.0,rate:100.0},
            TrafficClass {weight:1.0,holding_time:6.0,rate:400.0},
        ]
    }

    #[test]
    fn test_weighted_means() {
        let generator = FlowGenerator::new(5, classes(), 10, 4.0, 400.0, SeededSampler::new(1)).unwrap();
        assert!((generator.mean_holding_time() - 3.0).abs() < 1e-12);
        assert!((generator.mean_rate() - 175.0).abs() < 1e-12);
        assert!((generator.mean_inter_arrival() - 3.0*(175.0/400.0)/4.0).abs() < 1e-12);
    }
    #[test]
    fn test_same_seed_same_demands() {
        let draw = |seed| FlowGenerator::new(6, classes(), 200, 10.0, 400.0, SeededSampler::new(seed)).unwrap().generate();
        let first = draw(42);
        assert_eq!(first,draw(42));
        assert_ne!(first,draw(43));
        assert_eq!(first.len(),200);
        let mut last = 0.0;
        for demand in first.iter() {
            assert_ne!(demand.source,demand.destination);
            assert!(demand.source < 6 && demand.destination < 6);
            assert!(demand.arrival >= last);
            assert!(demand.departure >= demand.arrival);
            assert!(demand.rate == 100.0 || demand.rate == 400.0);
            last = demand.arrival;
        }
    }
    #[test]
    fn test_two_events_per_demand() {
        let demands = FlowGenerator::new(3, classes(), 7, 1.0, 400.0, SeededSampler::new(9)).unwrap().generate();
        let events = demand_events(&demands);
        assert_eq!(events.len(),14);
        let arrivals = events.iter().filter(|event| event.kind == EventKind::Arrival).count();
        assert_eq!(arrivals,7);
    }
    #[test]
    fn test_invalid_traffic() {
        let sampler = || SeededSampler::new(0);
        assert_eq!(FlowGenerator::new(1, classes(), 1, 1.0, 1.0, sampler()).err(),Some(TrafficError::TooFewNodes(1)));
        assert_eq!(FlowGenerator::new(3, vec![], 1, 1.0, 1.0, sampler()).err(),Some(TrafficError::NoClasses));
        let negative = vec![TrafficClass {weight:1.0,holding_time:1.0,rate:-10.0}];
        assert_eq!(
            FlowGenerator::new(3, negative, 1, 1.0, 1.0, sampler()).err(),
            Some(TrafficError::InvalidClass{class:0,field:"rate",value:-10.0})
        );
        assert!(matches!(
            FlowGenerator::new(3, classes(), 1, 0.0, 1.0, sampler()),
            Err(TrafficError::InvalidValue{field:"load",..})
        ));
    }
}
