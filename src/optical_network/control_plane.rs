use crate::scientific_computing::statistics::BlockingStats;
use super::event::{Event, EventKind};
use super::flow_generator::{Demand, DemandId};
use super::lightpath::LightPath;
use super::modulation::Modulation;
use super::qot::QotEstimator;
use super::routing::{Admission, AssignmentStrategy, BlockReason};
use super::simulator::SimulationError;
use super::topology::{LightpathId, LinkId, Topology};

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;
type HashSet<K> = std::collections::hash_set::HashSet<K,nohash::BuildNoHashHasher<usize>>;

// Pending -> Active | Blocked, Active -> Departed
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum DemandState {
    Pending,
    Active,
    Blocked,
    Departed,
}

#[derive(Clone,Debug,PartialEq)]
pub enum Outcome {
    Accepted(Vec<LightpathId>),
    Blocked(BlockReason),
}

#[derive(Clone,Debug,PartialEq)]
pub struct Decision {
    pub demand:DemandId,
    pub time:f64,
    pub outcome:Outcome,
}

pub struct ControlPlane {
    topology:Topology,
    strategy:Box<dyn AssignmentStrategy>,
    qot:QotEstimator,
    // demands never seen are Pending
    states:HashMap<DemandId,DemandState>,
    active:HashMap<DemandId,Vec<LightPath>>,
    formats:HashMap<LightpathId,Modulation>,
    degraded:HashSet<LightpathId>,
    decisions:Vec<Decision>,
    stats:BlockingStats,
}

impl ControlPlane {
    pub fn new(topology:Topology,strategy:Box<dyn AssignmentStrategy>,qot:QotEstimator) -> Self {
        Self {
            topology,
            strategy,
            qot,
            states:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            active:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            formats:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            degraded:HashSet::with_hasher(nohash::BuildNoHashHasher::default()),
            decisions:vec![],
            stats:BlockingStats::new(),
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
    pub fn stats(&self) -> &BlockingStats {
        &self.stats
    }
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }
    pub fn state(&self,demand:DemandId) -> DemandState {
        self.states.get(&demand).copied().unwrap_or(DemandState::Pending)
    }
    pub fn lightpaths(&self,demand:DemandId) -> Option<&[LightPath]> {
        self.active.get(&demand).map(|lightpaths| lightpaths.as_slice())
    }
    pub fn active_len(&self) -> usize {
        self.active.len()
    }
    pub fn degraded(&self) -> Vec<LightpathId> {
        let mut degraded:Vec<_> = self.degraded.iter().copied().collect();
        degraded.sort_unstable();
        degraded
    }

    pub fn handle_event(&mut self,event:&Event,demand:Option<&Demand>) -> Result<(),SimulationError> {
        match event.kind {
            EventKind::SimulationStart => {
                log::info!("simulation started, {} nodes, {} links, strategy {}",
                    self.topology.nodes_len(),self.topology.links_len(),self.strategy.name());
                Ok(())
            },
            EventKind::SimulationEnd => {
                log::info!("simulation finished at {:.4}: {}",event.time,self.stats);
                Ok(())
            },
            EventKind::Arrival => {
                let demand = demand.ok_or(SimulationError::MissingDemand{kind:event.kind,time:event.time})?;
                self.arrive(demand, event.time)
            },
            EventKind::Departure => {
                let demand = event.demand.ok_or(SimulationError::MissingDemand{kind:event.kind,time:event.time})?;
                self.depart(demand)
            },
        }
    }

    fn arrive(&mut self,demand:&Demand,time:f64) -> Result<(),SimulationError> {
        if self.state(demand.id) != DemandState::Pending {
            return Err(SimulationError::DuplicateArrival(demand.id));
        }
        match self.strategy.assign(demand, &mut self.topology, &self.qot)? {
            Admission::Accept{working,backup} => {
                log::debug!("demand {} accepted: {working}",demand.id);
                let lightpaths:Vec<LightPath> = std::iter::once(working).chain(backup).collect();
                let ids:Vec<LightpathId> = lightpaths.iter().map(|lightpath| lightpath.id).collect();
                let links:Vec<LinkId> = lightpaths.iter().flat_map(|lightpath| lightpath.links.iter().copied()).collect();
                for lightpath in lightpaths.iter() {
                    self.formats.insert(lightpath.id, lightpath.modulation);
                }
                self.active.insert(demand.id, lightpaths);
                self.states.insert(demand.id, DemandState::Active);
                self.decisions.push(Decision {demand:demand.id,time,outcome:Outcome::Accepted(ids)});
                self.stats.record_accept();
                self.refresh_neighbours(&links)?;
            },
            Admission::Block(reason) => {
                log::debug!("demand {} {}->{} blocked: {reason}",demand.id,demand.source,demand.destination);
                self.states.insert(demand.id, DemandState::Blocked);
                self.decisions.push(Decision {demand:demand.id,time,outcome:Outcome::Blocked(reason)});
                self.stats.record_block(reason);
            },
        }
        Ok(())
    }

    fn depart(&mut self,demand:DemandId) -> Result<(),SimulationError> {
        if self.state(demand) != DemandState::Active {
            log::trace!("departure of demand {demand} in state {:?} ignored",self.state(demand));
            return Ok(());
        }
        let lightpaths = self.active.remove(&demand).unwrap_or_default();
        let mut links = vec![];
        for lightpath in lightpaths {
            self.topology.release(&lightpath.links, lightpath.slots)?;
            self.formats.remove(&lightpath.id);
            self.degraded.remove(&lightpath.id);
            links.extend(lightpath.links);
        }
        self.states.insert(demand, DemandState::Departed);
        self.refresh_neighbours(&links)
    }

    // recompute every lightpath sharing a link with the change, flag those now below threshold
    fn refresh_neighbours(&mut self,links:&[LinkId]) -> Result<(),SimulationError> {
        if !self.qot.is_enabled() || links.is_empty() {
            return Ok(());
        }
        let affected = self.qot.affected(&self.topology, links);
        let snr = self.qot.recompute(&self.topology, &affected)?;
        for id in affected {
            let (Some(value),Some(modulation)) = (snr.get(&id),self.formats.get(&id)) else {
                continue;
            };
            if *value < modulation.min_snr_db() {
                if self.degraded.insert(id) {
                    log::warn!("lightpath {id} degraded: {value:.2} dB below the {modulation} threshold of {} dB",modulation.min_snr_db());
                    self.stats.record_degraded();
                }
            } else if self.degraded.remove(&id) {
                log::info!("lightpath {id} recovered at {value:.2} dB");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlPlane, DemandState, Outcome};
    use crate::optical_network::event::Event;
    use crate::optical_network::flow_generator::Demand;
    use crate::optical_network::lightpath::{LightPath, PathRole};
    use crate::optical_network::modulation::Modulation;
    use crate::optical_network::qot::QotEstimator;
    use crate::optical_network::routing::{Admission, AssignmentStrategy, BlockReason, ShortestPath};
    use crate::optical_network::routing::test_support::{demand, ring};
    use crate::optical_network::simulator::SimulationError;
    use crate::optical_network::topology::{SlotRange, Topology, TopologyError};
    use crate::scientific_computing::gsnr_estimation::FiberParameters;

    // places demand i on slots [2i,2i+1] of its shortest path, no QoT check
    struct FixedSlots;

    impl AssignmentStrategy for FixedSlots {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn assign(&self,demand:&Demand,topology:&mut Topology,_:&QotEstimator) -> Result<Admission,TopologyError> {
            let path = topology.graph().shortest_path(demand.source, demand.destination).unwrap();
            let slots = SlotRange::new(demand.id*2,2);
            let id = topology.reserve(&path.links, slots)?;
            let working = LightPath {
                id,
                demand:demand.id,
                nodes:path.nodes,
                links:path.links,
                slots,
                modulation:Modulation::Qam16,
                role:PathRole::Working,
                length:path.weight,
            };
            Ok(Admission::Accept{working,backup:None})
        }
    }

    fn plane() -> ControlPlane {
        ControlPlane::new(ring(5, 4, 100.0), Box::new(ShortestPath), QotEstimator::disabled(12.5))
    }

    #[test]
    fn test_lifecycle() {
        let mut plane = plane();
        let first = demand(0,0,2,100.0);
        assert_eq!(plane.state(0),DemandState::Pending);
        plane.handle_event(&Event::arrival(0.0, 0), Some(&first)).unwrap();
        assert_eq!(plane.state(0),DemandState::Active);
        assert_eq!(plane.lightpaths(0).unwrap().len(),1);
        assert_eq!(plane.topology().available_slots(0).unwrap(),2);
        plane.handle_event(&Event::departure(1.0, 0), None).unwrap();
        assert_eq!(plane.state(0),DemandState::Departed);
        assert_eq!(plane.topology().available_slots(0).unwrap(),4);
        assert_eq!(plane.active_len(),0);
        assert_eq!(plane.decisions()[0].outcome,Outcome::Accepted(vec![0]));
    }
    #[test]
    fn test_blocked_departure_is_ignored() {
        let mut plane = plane();
        plane.handle_event(&Event::arrival(0.0, 0), Some(&demand(0,0,1,150.0))).unwrap();
        plane.handle_event(&Event::arrival(0.5, 1), Some(&demand(1,0,1,150.0))).unwrap();
        assert_eq!(plane.state(1),DemandState::Blocked);
        assert_eq!(plane.decisions()[1].outcome,Outcome::Blocked(BlockReason::NoSpectrum));
        plane.handle_event(&Event::departure(1.0, 1), None).unwrap();
        assert_eq!(plane.state(1),DemandState::Blocked);
        assert_eq!(plane.state(0),DemandState::Active);
        assert_eq!(plane.stats().blocked(),1);
        assert_eq!(plane.stats().accepted(),1);
        // never arrived
        plane.handle_event(&Event::departure(2.0, 7), None).unwrap();
    }
    #[test]
    fn test_second_arrival_is_an_error() {
        let mut plane = plane();
        let first = demand(0,0,2,10.0);
        plane.handle_event(&Event::arrival(0.0, 0), Some(&first)).unwrap();
        let err = plane.handle_event(&Event::arrival(0.1, 0), Some(&first)).unwrap_err();
        assert!(matches!(err,SimulationError::DuplicateArrival(0)));
        assert_eq!(plane.stats().total(),1);
    }
    #[test]
    fn test_degraded_counted_once() {
        let weak = FiberParameters {launch_power_dbm:-35.0,..FiberParameters::default()};
        let mut plane = ControlPlane::new(ring(5, 8, 100.0), Box::new(FixedSlots), QotEstimator::new(weak, 12.5));
        plane.handle_event(&Event::arrival(0.0, 0), Some(&demand(0,0,2,100.0))).unwrap();
        assert_eq!(plane.degraded(),vec![0]);
        plane.handle_event(&Event::arrival(0.5, 1), Some(&demand(1,0,1,100.0))).unwrap();
        assert_eq!(plane.degraded(),vec![0,1]);
        assert_eq!(plane.stats().degraded(),2);
        plane.handle_event(&Event::departure(1.0, 1), None).unwrap();
        assert_eq!(plane.degraded(),vec![0]);
        plane.handle_event(&Event::departure(2.0, 0), None).unwrap();
        assert!(plane.degraded().is_empty());
        assert_eq!(plane.stats().degraded(),2);
        assert_eq!(plane.stats().accepted(),2);
    }
}
