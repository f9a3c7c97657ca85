use crate::dsa::graph::Path;
use crate::optical_network::flow_generator::Demand;
use crate::optical_network::lightpath::PathRole;
use crate::optical_network::modulation::Modulation;
use crate::optical_network::qot::QotEstimator;
use crate::optical_network::topology::{LinkId, Topology, TopologyError};
use super::{Admission, AssignmentStrategy, BlockReason, Misses, place_on_path};

// K shortest candidates ranked by how tightly the demand fills the free blocks it lands in
pub struct KShortestPathFragmentationAware {
    k:usize,
}

// lower is better, None when no aligned run of `required` free slots exists on the path
pub fn fragmentation_score(topology:&Topology,links:&[LinkId],required:usize) -> Result<Option<f64>,TopologyError> {
    let fits = topology.common_free_slots(links)?.into_iter().any(|(_,len)| len >= required);
    if !fits {
        return Ok(None);
    }
    let mut score = 0.0;
    for link in links {
        let link = topology.try_link(*link)?;
        let Some(block) = link.smallest_fitting_block(required) else {
            return Ok(None);
        };
        score += (required*block) as f64/link.available_slots() as f64;
    }
    Ok(Some(score))
}

impl KShortestPathFragmentationAware {
    pub fn new(k:usize) -> Self {
        Self {k:k.max(1)}
    }

    fn score(&self,demand:&Demand,topology:&Topology,path:&Path,misses:&mut Misses) -> Result<f64,TopologyError> {
        let length = topology.path_length(&path.links)?;
        let Some(modulation) = Modulation::best_for(length) else {
            misses.qot = true;
            return Ok(f64::INFINITY);
        };
        let required = modulation.required_slots(demand.rate, topology.path_slot_capacity(&path.links)?);
        match fragmentation_score(topology, &path.links, required)? {
            Some(score) => Ok(score),
            None => {
                misses.spectrum = true;
                Ok(f64::INFINITY)
            }
        }
    }
}

impl AssignmentStrategy for KShortestPathFragmentationAware {
    fn name(&self) -> &'static str {
        "ksp-fragmentation-aware"
    }
    fn assign(&self,demand:&Demand,topology:&mut Topology,qot:&QotEstimator) -> Result<Admission,TopologyError> {
        let candidates = topology.graph().k_shortest_paths(demand.source, demand.destination, self.k);
        if candidates.is_empty() {
            return Ok(Admission::Block(BlockReason::NoPath));
        }
        let mut misses = Misses::default();
        let mut ranked = Vec::with_capacity(candidates.len());
        for path in candidates {
            let score = self.score(demand, topology, &path, &mut misses)?;
            ranked.push((score,path));
        }
        // stable, equal scores keep enumeration order
        ranked.sort_by(|a,b| a.0.total_cmp(&b.0));
        for (score,path) in ranked {
            if score.is_infinite() {
                continue;
            }
            log::trace!("demand {}: trying {:?} with score {score:.3}",demand.id,path.nodes);
            match place_on_path(topology, qot, demand, &path, PathRole::Working)? {
                Ok(working) => return Ok(Admission::Accept{working,backup:None}),
                Err(missed) => misses.merge(missed),
            }
        }
        Ok(Admission::Block(misses.reason()))
    }
}
