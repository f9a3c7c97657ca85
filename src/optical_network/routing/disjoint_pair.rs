use crate::dsa::graph::Path;
use crate::optical_network::flow_generator::Demand;
use crate::optical_network::lightpath::PathRole;
use crate::optical_network::qot::QotEstimator;
use crate::optical_network::topology::{Topology, TopologyError};
use super::{Admission, AssignmentStrategy, BlockReason, Misses, place_on_path};

// link-disjoint working and backup from Suurballe's pair, committed together or not at all
pub struct SuurballeDisjointPair {
    // reject pairs whose paths cross the same risk-flagged node
    avoid_shared_risk:bool,
}

fn inner(path:&Path) -> &[usize] {
    if path.nodes.len() < 2 {
        return &[];
    }
    &path.nodes[1..path.nodes.len() - 1]
}

fn shares_risk(topology:&Topology,working:&Path,backup:&Path) -> bool {
    inner(working).iter()
        .filter(|node| topology.node(**node).is_some_and(|node| node.risk))
        .any(|node| inner(backup).contains(node))
}

impl SuurballeDisjointPair {
    pub fn new(avoid_shared_risk:bool) -> Self {
        Self {avoid_shared_risk}
    }
}

impl AssignmentStrategy for SuurballeDisjointPair {
    fn name(&self) -> &'static str {
        "disjoint-pair"
    }
    fn assign(&self,demand:&Demand,topology:&mut Topology,qot:&QotEstimator) -> Result<Admission,TopologyError> {
        let mut misses = Misses::default();
        let mut reachable = false;
        let mut tried:Vec<(Vec<usize>,Vec<usize>)> = vec![];
        // links with spare spectrum first, then the whole physical topology
        for graph in [topology.resource_graph(),topology.graph()] {
            let pair = graph.disjoint_pair(demand.source, demand.destination);
            let Some(working) = pair.working else {
                continue;
            };
            reachable = true;
            let Some(backup) = pair.backup else {
                continue;
            };
            let key = (working.links.clone(),backup.links.clone());
            if tried.contains(&key) {
                continue;
            }
            tried.push(key);
            if self.avoid_shared_risk && shares_risk(topology, &working, &backup) {
                log::debug!("demand {}: pair {:?} / {:?} crosses a shared risk node",demand.id,working.nodes,backup.nodes);
                continue;
            }
            let placed = match place_on_path(topology, qot, demand, &working, PathRole::Working)? {
                Ok(placed) => placed,
                Err(missed) => {
                    misses.merge(missed);
                    continue;
                }
            };
            match place_on_path(topology, qot, demand, &backup, PathRole::Backup)? {
                Ok(protection) => return Ok(Admission::Accept{working:placed,backup:Some(protection)}),
                Err(missed) => {
                    // roll back so the pair stays all or nothing
                    topology.release_reservation(placed.id)?;
                    misses.merge(missed);
                }
            }
        }
        if !reachable {
            return Ok(Admission::Block(BlockReason::NoPath));
        }
        if misses == Misses::default() {
            return Ok(Admission::Block(BlockReason::NoDisjointBackup));
        }
        Ok(Admission::Block(misses.reason()))
    }
}

#[cfg(test)]
mod tests {
    use super::SuurballeDisjointPair;
    use crate::optical_network::lightpath::PathRole;
    use crate::optical_network::routing::{Admission, AssignmentStrategy, BlockReason};
    use crate::optical_network::routing::test_support::{demand, ring};
    use crate::optical_network::qot::QotEstimator;
    use crate::optical_network::topology::{Link, Node, SlotRange, Topology};

    fn accept(admission:Admission) -> (Vec<usize>,Vec<usize>) {
        match admission {
            Admission::Accept{working,backup:Some(backup)} => {
                assert_eq!(working.role,PathRole::Working);
                assert_eq!(backup.role,PathRole::Backup);
                assert!(!working.shares_link_with(&backup.links));
                (working.nodes,backup.nodes)
            },
            other => panic!("expected a protected accept, got {other:?}")
        }
    }

    #[test]
    fn test_ring_pair() {
        let mut topo = ring(5, 4, 100.0);
        let strategy = SuurballeDisjointPair::new(false);
        let (working,backup) = accept(strategy.assign(&demand(0,0,2,100.0), &mut topo, &QotEstimator::disabled(12.5)).unwrap());
        assert_eq!(working,vec![0,1,2]);
        assert_eq!(backup,vec![0,4,3,2]);
        for link in 0..5 {
            assert_eq!(topo.available_slots(link).unwrap(),2);
        }
    }
    #[test]
    fn test_bridge_has_no_backup() {
        let nodes = (0..3).map(Node::new).collect();
        let links = vec![Link::new(0, 0, 1, 4, 12.5, 100.0),Link::new(1, 1, 2, 4, 12.5, 100.0)];
        let mut topo = Topology::new(nodes, links).unwrap();
        let admission = SuurballeDisjointPair::new(false)
            .assign(&demand(0,0,2,10.0), &mut topo, &QotEstimator::disabled(12.5))
            .unwrap();
        assert_eq!(admission,Admission::Block(BlockReason::NoDisjointBackup));
        assert_eq!(topo.reservations_len(),0);
    }
    #[test]
    fn test_backup_failure_rolls_back() {
        let mut topo = ring(5, 4, 100.0);
        topo.reserve(&[3], SlotRange::new(0,4)).unwrap();
        let admission = SuurballeDisjointPair::new(false)
            .assign(&demand(0,0,2,100.0), &mut topo, &QotEstimator::disabled(12.5))
            .unwrap();
        assert_eq!(admission,Admission::Block(BlockReason::NoSpectrum));
        assert_eq!(topo.available_slots(0).unwrap(),4);
        assert_eq!(topo.available_slots(1).unwrap(),4);
        assert_eq!(topo.reservations_len(),1);
    }
    #[test]
    fn test_shared_risk_node() {
        // both routes pass node 2, parallel fibres from 2 to 4
        let mut nodes:Vec<Node> = (0..5).map(Node::new).collect();
        nodes[2].risk = true;
        let links = vec![
            Link::new(0, 0, 1, 4, 12.5, 50.0),
            Link::new(1, 1, 2, 4, 12.5, 50.0),
            Link::new(2, 0, 3, 4, 12.5, 60.0),
            Link::new(3, 3, 2, 4, 12.5, 60.0),
            Link::new(4, 2, 4, 4, 12.5, 50.0),
            Link::new(5, 2, 4, 4, 12.5, 50.0),
        ];
        let topo = Topology::new(nodes, links).unwrap();
        let qot = QotEstimator::disabled(12.5);
        let mut strict = topo.clone();
        let admission = SuurballeDisjointPair::new(true).assign(&demand(0,0,4,10.0), &mut strict, &qot).unwrap();
        assert_eq!(admission,Admission::Block(BlockReason::NoDisjointBackup));
        let mut relaxed = topo;
        let (working,backup) = accept(SuurballeDisjointPair::new(false).assign(&demand(0,0,4,10.0), &mut relaxed, &qot).unwrap());
        assert!(working.contains(&2) && backup.contains(&2));
    }
}
