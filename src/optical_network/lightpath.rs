use std::fmt::Display;

use super::flow_generator::DemandId;
use super::modulation::Modulation;
use super::topology::{LightpathId, LinkId, NodeId, SlotRange};

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum PathRole {
    Working,
    Backup,
}

// lives from a successful reserve until the owning demand departs
#[derive(Clone,Debug,PartialEq)]
pub struct LightPath {
    // same id as the topology reservation holding the slots
    pub id:LightpathId,
    pub demand:DemandId,
    pub nodes:Vec<NodeId>,
    pub links:Vec<LinkId>,
    pub slots:SlotRange,
    pub modulation:Modulation,
    pub role:PathRole,
    pub length:f64,
}

impl LightPath {
    pub fn shares_link_with(&self,links:&[LinkId]) -> bool {
        self.links.iter().any(|link| links.contains(link))
    }
}

impl Display for LightPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"lightpath {} ({:?}) nodes {:?} slots {} {}",self.id,self.role,self.nodes,self.slots,self.modulation)
    }
}
