use crate::optical_network::flow_generator::Demand;
use crate::optical_network::lightpath::PathRole;
use crate::optical_network::qot::QotEstimator;
use crate::optical_network::topology::{Topology, TopologyError};
use super::{Admission, AssignmentStrategy, BlockReason, place_on_path};

// single Dijkstra route over the physical topology, first fit along it
pub struct ShortestPath;

impl AssignmentStrategy for ShortestPath {
    fn name(&self) -> &'static str {
        "shortest-path"
    }
    fn assign(&self,demand:&Demand,topology:&mut Topology,qot:&QotEstimator) -> Result<Admission,TopologyError> {
        let Some(path) = topology.graph().shortest_path(demand.source, demand.destination) else {
            return Ok(Admission::Block(BlockReason::NoPath));
        };
        Ok(match place_on_path(topology, qot, demand, &path, PathRole::Working)? {
            Ok(working) => Admission::Accept{working,backup:None},
            Err(misses) => Admission::Block(misses.reason()),
        })
    }
}
