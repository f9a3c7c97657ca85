// routing, modulation and spectrum assignment
// a strategy either reserves everything a demand needs or nothing at all

pub mod disjoint_pair;
pub mod fragmentation_aware;
pub mod shortest_path;

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RoutingConfig;
use crate::dsa::graph::Path;
use super::flow_generator::Demand;
use super::lightpath::{LightPath, PathRole};
use super::modulation::Modulation;
use super::qot::QotEstimator;
use super::topology::{SlotRange, Topology, TopologyError};

pub use disjoint_pair::SuurballeDisjointPair;
pub use fragmentation_aware::KShortestPathFragmentationAware;
pub use shortest_path::ShortestPath;

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum BlockReason {
    NoPath,
    NoSpectrum,
    QotFail,
    NoDisjointBackup,
}

impl BlockReason {
    pub const ALL:[BlockReason;4] = [BlockReason::NoPath,BlockReason::NoSpectrum,BlockReason::QotFail,BlockReason::NoDisjointBackup];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::NoPath => "no-path",
            BlockReason::NoSpectrum => "no-spectrum",
            BlockReason::QotFail => "qot-fail",
            BlockReason::NoDisjointBackup => "no-disjoint-backup",
        }
    }
    pub fn index(&self) -> usize {
        match self {
            BlockReason::NoPath => 0,
            BlockReason::NoSpectrum => 1,
            BlockReason::QotFail => 2,
            BlockReason::NoDisjointBackup => 3,
        }
    }
}

impl Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}",self.as_str())
    }
}

#[derive(Clone,Debug,PartialEq)]
pub enum Admission {
    // slots of every returned lightpath are already reserved
    Accept{working:LightPath,backup:Option<LightPath>},
    Block(BlockReason),
}

pub trait AssignmentStrategy {
    fn name(&self) -> &'static str;
    // Err only on a broken resource invariant, running out of resources is a Block
    fn assign(&self,demand:&Demand,topology:&mut Topology,qot:&QotEstimator) -> Result<Admission,TopologyError>;
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,Default,Serialize,Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "shortest-path")]
    ShortestPath,
    #[default]
    #[serde(rename = "ksp-fragmentation-aware")]
    KspFragmentationAware,
    #[serde(rename = "disjoint-pair")]
    DisjointPair,
}

#[derive(Error,Debug,Clone,PartialEq)]
#[error("Unknown assignment strategy {0:?}")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shortest-path" => Ok(StrategyKind::ShortestPath),
            "ksp-fragmentation-aware" => Ok(StrategyKind::KspFragmentationAware),
            "disjoint-pair" => Ok(StrategyKind::DisjointPair),
            other => Err(UnknownStrategy(other.to_string()))
        }
    }
}

impl StrategyKind {
    pub fn build(&self,config:&RoutingConfig) -> Box<dyn AssignmentStrategy> {
        match self {
            StrategyKind::ShortestPath => Box::new(ShortestPath),
            StrategyKind::KspFragmentationAware => Box::new(KShortestPathFragmentationAware::new(config.k)),
            StrategyKind::DisjointPair => Box::new(SuurballeDisjointPair::new(config.avoid_shared_risk)),
        }
    }
}

// what went wrong while trying to place a demand on a single path
#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub(crate) struct Misses {
    pub qot:bool,
    pub spectrum:bool,
}

impl Misses {
    pub fn merge(&mut self,other:Misses) {
        self.qot |= other.qot;
        self.spectrum |= other.spectrum;
    }
    // qot failures and unreachable lengths outrank a plain lack of slots
    pub fn reason(&self) -> BlockReason {
        if self.qot {
            BlockReason::QotFail
        } else {
            BlockReason::NoSpectrum
        }
    }
}

// first fit over offsets, trying every reachable format at each offset before moving on
pub(crate) fn place_on_path(
    topology:&mut Topology,
    qot:&QotEstimator,
    demand:&Demand,
    path:&Path,
    role:PathRole
) -> Result<Result<LightPath,Misses>,TopologyError> {
    let mut misses = Misses::default();
    let length = topology.path_length(&path.links)?;
    let formats:Vec<Modulation> = Modulation::candidates_for(length).collect();
    if formats.is_empty() {
        log::debug!("demand {}: {length:.1} km is out of reach of every format",demand.id);
        misses.qot = true;
        return Ok(Err(misses));
    }
    let capacity = topology.path_slot_capacity(&path.links)?;
    let occupancy = topology.path_occupancy(&path.links)?;
    for offset in 0..occupancy.len() {
        if occupancy.get_at(offset) != Some(false) {
            continue;
        }
        for modulation in formats.iter().copied() {
            let required = modulation.required_slots(demand.rate, capacity);
            if required > occupancy.len() - offset {
                misses.spectrum = true;
                continue;
            }
            let slots = SlotRange::new(offset, required);
            if occupancy.range_all(slots.as_range(), false) != Some(true) {
                misses.spectrum = true;
                continue;
            }
            if !qot.verify(topology, &path.links, slots, modulation)? {
                misses.qot = true;
                continue;
            }
            let id = match topology.reserve(&path.links, slots) {
                Ok(id) => id,
                Err(TopologyError::ResourceConflict{..}) => {
                    misses.spectrum = true;
                    continue;
                },
                Err(err) => return Err(err)
            };
            return Ok(Ok(LightPath {
                id,
                demand:demand.id,
                nodes:path.nodes.clone(),
                links:path.links.clone(),
                slots,
                modulation,
                role,
                length,
            }));
        }
    }
    misses.spectrum = true;
    Ok(Err(misses))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::optical_network::flow_generator::Demand;
    use crate::optical_network::topology::{Link, Node, Topology};

    pub fn ring(n:usize,slots:usize,weight:f64) -> Topology {
        let nodes = (0..n).map(Node::new).collect();
        let links = (0..n).map(|i| Link::new(i, i, (i+1)%n, slots, 12.5, weight)).collect();
        Topology::new(nodes, links).unwrap()
    }
    pub fn demand(id:usize,source:usize,destination:usize,rate:f64) -> Demand {
        Demand {id,source,destination,rate,holding_time:1.0,arrival:id as f64,departure:id as f64 + 1.0}
    }
}
