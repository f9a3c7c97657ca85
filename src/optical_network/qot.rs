use rayon::prelude::*;

use crate::scientific_computing::gsnr_estimation::{
    BandWidthTHZ, Channel, DB, FiberParameters, GRID_START_THZ, linear_to_db, span_count
};
use super::modulation::Modulation;
use super::topology::{LightpathId, LinkId, SlotRange, Topology, TopologyError};

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;
type Result<T> = std::result::Result<T,TopologyError>;

// below this many lightpaths a recomputation stays on the calling thread
const PARALLEL_THRESHOLD:usize = 16;

#[derive(Clone,Debug)]
pub struct QotEstimator {
    fiber:FiberParameters,
    slot_width:BandWidthTHZ,
    enabled:bool,
    parallel:bool,
}

impl QotEstimator {
    // slot size in GHz
    pub fn new(fiber:FiberParameters,slot_size:f64) -> Self {
        Self {fiber,slot_width:slot_size/1000.0,enabled:true,parallel:false}
    }
    // every candidate passes, nothing is ever degraded
    pub fn disabled(slot_size:f64) -> Self {
        Self {enabled:false,..Self::new(FiberParameters::default(), slot_size)}
    }
    pub fn with_parallel(mut self,parallel:bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
    pub fn fiber(&self) -> &FiberParameters {
        &self.fiber
    }

    fn channel(&self,slots:SlotRange) -> Channel {
        Channel {
            center:GRID_START_THZ + (slots.first as f64 + slots.len as f64/2.0)*self.slot_width,
            bandwidth:slots.len as f64*self.slot_width,
        }
    }

    // end to end SNR of a channel on `links`, co-routed reservations act as NLI
    // sources, `exclude` keeps a lightpath from interfering with itself
    pub fn snr_db(&self,topology:&Topology,links:&[LinkId],slots:SlotRange,exclude:Option<LightpathId>) -> Result<DB> {
        if links.is_empty() || slots.len == 0 {
            return Err(TopologyError::EmptyRequest);
        }
        let channel = self.channel(slots);
        let psd = self.fiber.launch_psd(self.slot_width);
        let signal = psd*channel.bandwidth;
        let mut noise = 0.0;
        for link in links {
            let spans = span_count(topology.try_link(*link)?.weight(), self.fiber.span_len);
            let neighbours:Vec<Channel> = topology.reservations_on(*link)
                .filter(|(id,reservation)| Some(*id) != exclude && !reservation.slots.overlaps(&slots))
                .map(|(_,reservation)| self.channel(reservation.slots))
                .collect();
            noise += spans as f64*self.fiber.span_noise(&channel, psd, &neighbours);
        }
        Ok(linear_to_db(signal/noise))
    }

    pub fn verify(&self,topology:&Topology,links:&[LinkId],slots:SlotRange,modulation:Modulation) -> Result<bool> {
        if !self.enabled {
            return Ok(true);
        }
        Ok(self.snr_db(topology, links, slots, None)? >= modulation.min_snr_db())
    }

    // lightpaths sharing at least one link with `links`, ascending
    pub fn affected(&self,topology:&Topology,links:&[LinkId]) -> Vec<LightpathId> {
        let mut ids:Vec<LightpathId> = links.iter()
            .flat_map(|link| topology.reservations_on(*link).map(|(id,_)| id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn snr_of(&self,topology:&Topology,id:LightpathId) -> Result<(LightpathId,DB)> {
        let reservation = topology.reservation(id).ok_or(TopologyError::UnknownReservation(id))?;
        Ok((id,self.snr_db(topology, &reservation.links, reservation.slots, Some(id))?))
    }

    // each worker owns a disjoint chunk of ids, results merge after the parallel section
    pub fn recompute(&self,topology:&Topology,ids:&[LightpathId]) -> Result<HashMap<LightpathId,DB>> {
        let mut snr = HashMap::with_capacity_and_hasher(ids.len(), nohash::BuildNoHashHasher::default());
        if !self.enabled {
            return Ok(snr);
        }
        if self.parallel && ids.len() >= PARALLEL_THRESHOLD {
            let chunk = ids.len().div_ceil(rayon::current_num_threads().max(1));
            let partials = ids.par_chunks(chunk)
                .map(|part| part.iter().map(|id| self.snr_of(topology, *id)).collect::<Result<Vec<_>>>())
                .collect::<Result<Vec<_>>>()?;
            snr.extend(partials.into_iter().flatten());
        } else {
            for id in ids {
                let (id,value) = self.snr_of(topology, *id)?;
                snr.insert(id, value);
            }
        }
        Ok(snr)
    }
}
