use std::fmt::Display;
use std::ops::Range;
use thiserror::Error;

use crate::dsa::bitset::BitSet;
use crate::dsa::graph::WeightedMultigraph;
use crate::scientific_computing::distribution::Sampler;

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;
type PairMap<V> = std::collections::HashMap<(NodeId,NodeId),V>;

pub type NodeId = usize;
pub type LinkId = usize;
pub type LightpathId = usize;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum TopologyError {
    #[error("Expected node id {expected} but found {found}, node ids must be dense and start at 0")]
    NodeIdOutOfOrder{expected:NodeId,found:NodeId},
    #[error("Expected link id {expected} but found {found}, link ids must be dense and start at 0")]
    LinkIdOutOfOrder{expected:LinkId,found:LinkId},
    #[error("Link {link} refers to node {node}, which does not exist")]
    DanglingNode{link:LinkId,node:NodeId},
    #[error("Link {link} starts and ends at node {node}")]
    SelfLoop{link:LinkId,node:NodeId},
    #[error("Link {link} has no spectrum slots")]
    NoSlots{link:LinkId},
    #[error("Link {link} has an invalid {field}: {value}")]
    InvalidLinkValue{link:LinkId,field:&'static str,value:f64},
    #[error("Link {0} does not exist")]
    UnknownLink(LinkId),
    #[error("Link {0} appears twice in one request")]
    RepeatedLink(LinkId),
    #[error("Empty link sequence or slot range")]
    EmptyRequest,
    #[error("Slots {range:?} do not fit on link {link} with {slots} slots")]
    SlotsOutOfBounds{link:LinkId,range:Range<usize>,slots:usize},
    #[error("Slots {range:?} on link {link} are already occupied")]
    ResourceConflict{link:LinkId,range:Range<usize>},
    #[error("No tracked reservation holds slots {range:?} on links {links:?}")]
    UntrackedRelease{links:Vec<LinkId>,range:Range<usize>},
    #[error("Lightpath {0} holds no reservation")]
    UnknownReservation(LightpathId),
    #[error("Risk node ratio {0} must lie within 0..=1")]
    InvalidRiskRatio(f64),
}

type Result<T> = std::result::Result<T,TopologyError>;

// contiguous slot indices [first, first+len)
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub struct SlotRange {
    pub first:usize,
    pub len:usize,
}

impl SlotRange {
    pub fn new(first:usize,len:usize) -> Self {
        Self {first,len}
    }
    // saturates so an oversized request reads as out of bounds
    pub fn end(&self) -> usize {
        self.first.saturating_add(self.len)
    }
    pub fn as_range(&self) -> Range<usize> {
        self.first..self.end()
    }
    pub fn overlaps(&self,other:&SlotRange) -> bool {
        self.first < other.end() && other.first < self.end()
    }
}

impl Display for SlotRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.len == 0 {
            return write!(f,"[]");
        }
        write!(f,"[{},{}]",self.first,self.end() - 1)
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct Node {
    id:NodeId,
    pub role:Option<String>,
    // flagged as an eavesdropping risk
    pub risk:bool,
}

impl Node {
    pub fn new(id:NodeId) -> Self {
        Self {id,role:None,risk:false}
    }
    pub fn with_role(mut self,role:impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
    pub fn id(&self) -> NodeId {
        self.id
    }
}

#[derive(Clone,Debug)]
pub struct Link {
    id:LinkId,
    source:NodeId,
    destination:NodeId,
    directed:bool,
    // bit set means the slot is occupied
    occupied:BitSet,
    // Gb/s a slot can carry at one bit per symbol
    slot_capacity:f64,
    // km, drives QoT and modulation reach
    weight:f64,
}

impl Link {
    pub fn new(id:LinkId,source:NodeId,destination:NodeId,slots:usize,slot_capacity:f64,weight:f64) -> Self {
        Self {
            id,source,destination,
            directed:false,
            occupied:BitSet::with_len(slots, false),
            slot_capacity,
            weight
        }
    }
    pub fn directed(mut self) -> Self {
        self.directed = true;
        self
    }
    pub fn id(&self) -> LinkId {
        self.id
    }
    pub fn source(&self) -> NodeId {
        self.source
    }
    pub fn destination(&self) -> NodeId {
        self.destination
    }
    pub fn is_directed(&self) -> bool {
        self.directed
    }
    pub fn weight(&self) -> f64 {
        self.weight
    }
    pub fn slot_capacity(&self) -> f64 {
        self.slot_capacity
    }
    pub fn slots(&self) -> usize {
        self.occupied.len()
    }
    pub fn occupancy(&self) -> &BitSet {
        &self.occupied
    }
    pub fn available_slots(&self) -> usize {
        self.occupied.count_zeros()
    }
    pub fn occupied_slots(&self) -> usize {
        self.occupied.count_ones()
    }
    pub fn is_free(&self,slots:SlotRange) -> bool {
        self.occupied.range_all(slots.as_range(), false).unwrap_or(false)
    }
    // maximal free runs as (first slot, length)
    pub fn free_blocks(&self) -> Vec<(usize,usize)> {
        self.occupied.runs(false)
    }
    pub fn free_block_lengths(&self) -> Vec<usize> {
        self.free_blocks().into_iter().map(|(_,len)| len).collect()
    }
    pub fn max_contiguous_free_block(&self) -> usize {
        self.free_block_lengths().into_iter().max().unwrap_or(0)
    }
    // size of the tightest free block that still holds `required` slots
    pub fn smallest_fitting_block(&self,required:usize) -> Option<usize> {
        self.free_block_lengths().into_iter().filter(|len| *len >= required).min()
    }
    // 1 - largest block / free slots, 0 when the free spectrum is one block
    pub fn external_fragmentation(&self) -> f64 {
        let available = self.available_slots();
        if available == 0 {
            return 0.0;
        }
        1.0 - self.max_contiguous_free_block() as f64/available as f64
    }
    // entropy of the free block sizes relative to the whole grid
    pub fn entropy_fragmentation(&self) -> f64 {
        if self.max_contiguous_free_block() == self.available_slots() {
            return 0.0;
        }
        let total = self.slots() as f64;
        -self.free_block_lengths().into_iter()
            .map(|len| {
                let share = len as f64/total;
                share*share.ln()
            })
            .sum::<f64>()
    }
    fn check_bounds(&self,slots:SlotRange) -> Result<()> {
        if slots.end() > self.slots() {
            return Err(TopologyError::SlotsOutOfBounds{link:self.id,range:slots.as_range(),slots:self.slots()});
        }
        Ok(())
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct Reservation {
    pub links:Vec<LinkId>,
    pub slots:SlotRange,
}

// owns every node and link, ids double as indices
#[derive(Clone,Debug)]
pub struct Topology {
    nodes:Vec<Node>,
    links:Vec<Link>,
    endpoints:PairMap<Vec<LinkId>>,
    reservations:HashMap<LightpathId,Reservation>,
    // lightpaths per link, in reservation order
    link_reservations:Vec<Vec<LightpathId>>,
    next_reservation:LightpathId,
}

impl Topology {
    pub fn new(nodes:Vec<Node>,links:Vec<Link>) -> Result<Self> {
        for (expected,node) in nodes.iter().enumerate() {
            if node.id != expected {
                return Err(TopologyError::NodeIdOutOfOrder{expected,found:node.id});
            }
        }
        let mut endpoints:PairMap<Vec<LinkId>> = PairMap::with_capacity(links.len()*2);
        for (expected,link) in links.iter().enumerate() {
            if link.id != expected {
                return Err(TopologyError::LinkIdOutOfOrder{expected,found:link.id});
            }
            for node in [link.source,link.destination] {
                if node >= nodes.len() {
                    return Err(TopologyError::DanglingNode{link:link.id,node});
                }
            }
            if link.source == link.destination {
                return Err(TopologyError::SelfLoop{link:link.id,node:link.source});
            }
            if link.slots() == 0 {
                return Err(TopologyError::NoSlots{link:link.id});
            }
            if !link.weight.is_finite() || link.weight <= 0.0 {
                return Err(TopologyError::InvalidLinkValue{link:link.id,field:"weight",value:link.weight});
            }
            if !link.slot_capacity.is_finite() || link.slot_capacity <= 0.0 {
                return Err(TopologyError::InvalidLinkValue{link:link.id,field:"slot capacity",value:link.slot_capacity});
            }
            endpoints.entry((link.source,link.destination)).or_default().push(link.id);
            if !link.directed {
                endpoints.entry((link.destination,link.source)).or_default().push(link.id);
            }
        }
        let link_reservations = vec![vec![];links.len()];
        Ok(Self {
            nodes,
            links,
            endpoints,
            reservations:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            link_reservations,
            next_reservation:0,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
    pub fn links(&self) -> &[Link] {
        &self.links
    }
    pub fn nodes_len(&self) -> usize {
        self.nodes.len()
    }
    pub fn links_len(&self) -> usize {
        self.links.len()
    }
    pub fn node(&self,id:NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }
    pub fn link(&self,id:LinkId) -> Option<&Link> {
        self.links.get(id)
    }
    pub fn try_link(&self,id:LinkId) -> Result<&Link> {
        self.links.get(id).ok_or(TopologyError::UnknownLink(id))
    }
    // every link usable from a to b, parallel fibres included
    pub fn links_between(&self,a:NodeId,b:NodeId) -> &[LinkId] {
        self.endpoints.get(&(a,b)).map(|links| links.as_slice()).unwrap_or(&[])
    }
    pub fn path_length(&self,links:&[LinkId]) -> Result<f64> {
        let mut length = 0.0;
        for link in links {
            length += self.try_link(*link)?.weight;
        }
        Ok(length)
    }
    // the narrowest per-slot capacity along the path bounds what each slot carries
    pub fn path_slot_capacity(&self,links:&[LinkId]) -> Result<f64> {
        if links.is_empty() {
            return Err(TopologyError::EmptyRequest);
        }
        let mut capacity = f64::INFINITY;
        for link in links {
            capacity = capacity.min(self.try_link(*link)?.slot_capacity());
        }
        Ok(capacity)
    }

    pub fn available_slots(&self,link:LinkId) -> Result<usize> {
        Ok(self.try_link(link)?.available_slots())
    }
    pub fn max_contiguous_free_block(&self,link:LinkId) -> Result<usize> {
        Ok(self.try_link(link)?.max_contiguous_free_block())
    }
    pub fn free_block_lengths(&self,link:LinkId) -> Result<Vec<usize>> {
        Ok(self.try_link(link)?.free_block_lengths())
    }

    // union of occupancy along a path, a clear bit is free on every link
    pub fn path_occupancy(&self,links:&[LinkId]) -> Result<BitSet> {
        let Some(first) = links.first() else {
            return Err(TopologyError::EmptyRequest);
        };
        let mut union = self.try_link(*first)?.occupied.clone();
        for link in &links[1..] {
            let link = self.try_link(*link)?;
            if union.union_with(&link.occupied).is_none() {
                // grids of different sizes only share their common prefix
                let common = union.len().min(link.slots());
                let mut clipped = BitSet::with_len(common, false);
                for index in 0..common {
                    let bit = union.get_at(index).unwrap_or(true) || link.occupied.get_at(index).unwrap_or(true);
                    clipped.store_at(index, bit);
                }
                union = clipped;
            }
        }
        Ok(union)
    }
    // maximal runs free on every link of the path, as (first slot, length)
    pub fn common_free_slots(&self,links:&[LinkId]) -> Result<Vec<(usize,usize)>> {
        Ok(self.path_occupancy(links)?.runs(false))
    }

    fn check_request(&self,links:&[LinkId],slots:SlotRange) -> Result<()> {
        if links.is_empty() || slots.len == 0 {
            return Err(TopologyError::EmptyRequest);
        }
        for (i,link) in links.iter().enumerate() {
            if links[..i].contains(link) {
                return Err(TopologyError::RepeatedLink(*link));
            }
            self.try_link(*link)?.check_bounds(slots)?;
        }
        Ok(())
    }

    // all or nothing: either every slot on every link gets marked or none does
    pub fn reserve(&mut self,links:&[LinkId],slots:SlotRange) -> Result<LightpathId> {
        self.check_request(links, slots)?;
        for link in links {
            if !self.links[*link].is_free(slots) {
                return Err(TopologyError::ResourceConflict{link:*link,range:slots.as_range()});
            }
        }
        for link in links {
            self.links[*link].occupied.store_range(slots.as_range(), true)
                .ok_or(TopologyError::SlotsOutOfBounds{link:*link,range:slots.as_range(),slots:self.links[*link].slots()})?;
        }
        let id = self.next_reservation;
        self.next_reservation += 1;
        for link in links {
            self.link_reservations[*link].push(id);
        }
        self.reservations.insert(id, Reservation {links:links.to_vec(),slots});
        Ok(id)
    }

    // only a range handed out by reserve, on exactly the same links, can be freed
    pub fn release(&mut self,links:&[LinkId],slots:SlotRange) -> Result<LightpathId> {
        self.check_request(links, slots)?;
        let untracked = || TopologyError::UntrackedRelease{links:links.to_vec(),range:slots.as_range()};
        let id = self.link_reservations[links[0]].iter()
            .copied()
            .find(|id| {
                self.reservations.get(id)
                    .is_some_and(|held| held.slots == slots && held.links == links)
            })
            .ok_or_else(untracked)?;
        self.release_reservation(id)?;
        Ok(id)
    }

    pub fn release_reservation(&mut self,id:LightpathId) -> Result<Reservation> {
        let reservation = self.reservations.remove(&id)
            .ok_or(TopologyError::UnknownReservation(id))?;
        for link in reservation.links.iter() {
            let link_state = &mut self.links[*link];
            debug_assert_eq!(link_state.occupied.range_all(reservation.slots.as_range(), true),Some(true));
            link_state.occupied.store_range(reservation.slots.as_range(), false)
                .ok_or(TopologyError::SlotsOutOfBounds{link:*link,range:reservation.slots.as_range(),slots:link_state.slots()})?;
            self.link_reservations[*link].retain(|held| *held != id);
        }
        Ok(reservation)
    }

    pub fn reservation(&self,id:LightpathId) -> Option<&Reservation> {
        self.reservations.get(&id)
    }
    pub fn reservations_len(&self) -> usize {
        self.reservations.len()
    }
    // lightpaths crossing a link, in the order they were reserved
    pub fn reservations_on(&self,link:LinkId) -> impl Iterator<Item = (LightpathId,&Reservation)> + '_ {
        self.link_reservations.get(link)
            .into_iter()
            .flatten()
            .filter_map(|id| Some((*id,self.reservations.get(id)?)))
    }

    pub fn graph(&self) -> WeightedMultigraph {
        self.graph_filtered(|_| true)
    }
    // links with at least one free slot left
    pub fn resource_graph(&self) -> WeightedMultigraph {
        self.graph_filtered(|link| link.available_slots() > 0)
    }
    fn graph_filtered(&self,keep:impl Fn(&Link) -> bool) -> WeightedMultigraph {
        let mut graph = WeightedMultigraph::with_capacity(self.nodes.len());
        for node in self.nodes.iter() {
            graph.push_node(node.id);
        }
        for link in self.links.iter().filter(|link| keep(*link)) {
            graph.push_link(link.source, link.destination, link.id, link.weight, link.directed);
        }
        graph
    }
    pub fn is_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        let mut graph = self.graph();
        // reachability ignores direction
        for link in self.links.iter().filter(|link| link.directed) {
            graph.push_link(link.destination, link.source, link.id, link.weight, true);
        }
        graph.dfs(0).is_some_and(|order| order.len() == self.nodes.len())
    }

    // marks floor(ratio*N) distinct nodes as eavesdropping risks
    pub fn flag_risk_nodes<S:Sampler>(&mut self,ratio:f64,sampler:&mut S) -> Result<Vec<NodeId>> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(TopologyError::InvalidRiskRatio(ratio));
        }
        let wanted = (ratio*self.nodes.len() as f64) as usize;
        let mut flagged = Vec::with_capacity(wanted);
        while flagged.len() < wanted {
            let node = sampler.uniform_index(self.nodes.len());
            if !flagged.contains(&node) {
                flagged.push(node);
                self.nodes[node].risk = true;
            }
        }
        flagged.sort_unstable();
        Ok(flagged)
    }
    pub fn risk_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().filter(|node| node.risk).map(|node| node.id).collect()
    }
}
