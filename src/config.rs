// plain data descriptors of a run, loaded from JSON
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optical_network::control_plane::ControlPlane;
use crate::optical_network::flow_generator::{FlowGenerator, TrafficClass, TrafficError};
use crate::optical_network::qot::QotEstimator;
use crate::optical_network::routing::StrategyKind;
use crate::optical_network::simulator::{SimulationError, Simulator};
use crate::optical_network::topology::{Link, Node, Topology, TopologyError};
use crate::scientific_computing::distribution::SeededSampler;
use crate::scientific_computing::gsnr_estimation::FiberParameters;

#[derive(Error,Debug)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),
    #[error("Invalid traffic: {0}")]
    Traffic(#[from] TrafficError),
    #[error("Invalid {section} setting {field}: {value}")]
    InvalidValue{section:&'static str,field:&'static str,value:f64},
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

type Result<T> = std::result::Result<T,ConfigError>;

fn default_slot_capacity() -> f64 {
    12.5
}
fn default_k() -> usize {
    3
}
fn default_true() -> bool {
    true
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct NodeConfig {
    pub id:usize,
    #[serde(default)]
    pub role:Option<String>,
    #[serde(default)]
    pub risk:bool,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct LinkConfig {
    pub id:usize,
    pub source:usize,
    pub destination:usize,
    pub slots:usize,
    #[serde(default = "default_slot_capacity")]
    pub slot_capacity:f64,
    // km
    pub weight:f64,
    #[serde(default)]
    pub directed:bool,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct TopologyConfig {
    pub nodes:Vec<NodeConfig>,
    pub links:Vec<LinkConfig>,
    // share of nodes randomly flagged as eavesdropping risks on top of explicit flags
    #[serde(default)]
    pub risk_node_ratio:f64,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct TrafficConfig {
    pub classes:Vec<TrafficClass>,
    pub demands:usize,
    pub load:f64,
    pub max_rate:f64,
    pub seed:u64,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct RoutingConfig {
    #[serde(default)]
    pub strategy:StrategyKind,
    #[serde(default = "default_k")]
    pub k:usize,
    // GHz
    #[serde(default = "default_slot_capacity")]
    pub slot_size:f64,
    #[serde(default)]
    pub avoid_shared_risk:bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strategy:StrategyKind::default(),
            k:default_k(),
            slot_size:default_slot_capacity(),
            avoid_shared_risk:false,
        }
    }
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct QotConfig {
    pub enabled:bool,
    pub parallel:bool,
    pub span_length:f64,
    pub launch_power_dbm:f64,
    pub noise_figure_db:f64,
    // dB/km
    pub attenuation_db:f64,
    // ps/nm/km
    pub dispersion:f64,
    pub gamma:f64,
}

impl Default for QotConfig {
    fn default() -> Self {
        Self {
            enabled:default_true(),
            parallel:false,
            span_length:80.0,
            launch_power_dbm:0.0,
            noise_figure_db:5.5,
            attenuation_db:0.2,
            dispersion:17.0,
            gamma:1.3,
        }
    }
}

impl QotConfig {
    pub fn fiber(&self) -> FiberParameters {
        FiberParameters::new(self.span_length, self.attenuation_db, self.dispersion, self.gamma, self.noise_figure_db, self.launch_power_dbm)
    }
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct SimulationConfig {
    pub topology:TopologyConfig,
    pub traffic:TrafficConfig,
    #[serde(default)]
    pub routing:RoutingConfig,
    #[serde(default)]
    pub qot:QotConfig,
}

fn check_positive(section:&'static str,field:&'static str,value:f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidValue{section,field,value});
    }
    Ok(())
}

fn check_finite(section:&'static str,field:&'static str,value:f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidValue{section,field,value});
    }
    Ok(())
}

impl SimulationConfig {
    pub fn from_json(json:&str) -> Result<Self> {
        let config:SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("routing", "k", self.routing.k as f64)?;
        check_positive("routing", "slot_size", self.routing.slot_size)?;
        if !(0.0..=1.0).contains(&self.topology.risk_node_ratio) {
            return Err(TopologyError::InvalidRiskRatio(self.topology.risk_node_ratio).into());
        }
        if self.qot.enabled {
            check_positive("qot", "span_length", self.qot.span_length)?;
            check_positive("qot", "attenuation_db", self.qot.attenuation_db)?;
            check_positive("qot", "dispersion", self.qot.dispersion)?;
            check_positive("qot", "gamma", self.qot.gamma)?;
            check_finite("qot", "launch_power_dbm", self.qot.launch_power_dbm)?;
            check_finite("qot", "noise_figure_db", self.qot.noise_figure_db)?;
        }
        Ok(())
    }

    pub fn build_topology(&self) -> Result<Topology> {
        let nodes = self.topology.nodes.iter()
            .map(|node| {
                let mut built = match &node.role {
                    Some(role) => Node::new(node.id).with_role(role.clone()),
                    None => Node::new(node.id),
                };
                built.risk = node.risk;
                built
            })
            .collect();
        let links = self.topology.links.iter()
            .map(|link| {
                let built = Link::new(link.id, link.source, link.destination, link.slots, link.slot_capacity, link.weight);
                if link.directed {built.directed()} else {built}
            })
            .collect();
        Ok(Topology::new(nodes, links)?)
    }

    pub fn qot_estimator(&self) -> QotEstimator {
        if !self.qot.enabled {
            return QotEstimator::disabled(self.routing.slot_size);
        }
        QotEstimator::new(self.qot.fiber(), self.routing.slot_size).with_parallel(self.qot.parallel)
    }

    // validated topology, risk flags, generated traffic and the chosen strategy in one simulator
    pub fn build(&self) -> Result<Simulator> {
        self.validate()?;
        let mut topology = self.build_topology()?;
        if !topology.is_connected() {
            log::warn!("topology is not connected, some demands will block with no-path");
        }
        let mut sampler = SeededSampler::new(self.traffic.seed);
        if self.topology.risk_node_ratio > 0.0 {
            let flagged = topology.flag_risk_nodes(self.topology.risk_node_ratio, &mut sampler)?;
            log::debug!("risk nodes {flagged:?}");
        }
        let mut generator = FlowGenerator::new(
            topology.nodes_len(),
            self.traffic.classes.clone(),
            self.traffic.demands,
            self.traffic.load,
            self.traffic.max_rate,
            sampler
        )?;
        let demands = generator.generate();
        log::info!("{} demands generated from seed {}, mean inter-arrival {:.4}",
            demands.len(),self.traffic.seed,generator.mean_inter_arrival());
        let strategy = self.routing.strategy.build(&self.routing);
        let control = ControlPlane::new(topology, strategy, self.qot_estimator());
        Ok(Simulator::new(control, demands)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SimulationConfig};
    use crate::optical_network::routing::StrategyKind;
    use crate::optical_network::topology::TopologyError;

    const RING:&str = r#"{
        "topology": {
            "nodes": [{"id":0},{"id":1,"role":"roadm"},{"id":2,"risk":true}],
            "links": [
                {"id":0,"source":0,"destination":1,"slots":16,"weight":120.0},
                {"id":1,"source":1,"destination":2,"slots":16,"weight":80.0},
                {"id":2,"source":2,"destination":0,"slots":16,"weight":90.0,"directed":true}
            ]
        },
        "traffic": {
            "classes": [{"weight":1.0,"holding_time":1.0,"rate":100.0}],
            "demands": 20,
            "load": 5.0,
            "max_rate": 100.0,
            "seed": 3
        },
        "routing": {"strategy":"disjoint-pair"}
    }"#;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::from_json(RING).unwrap();
        assert_eq!(config.routing.strategy,StrategyKind::DisjointPair);
        assert_eq!(config.routing.k,3);
        assert_eq!(config.routing.slot_size,12.5);
        assert!(config.qot.enabled);
        assert_eq!(config.qot.span_length,80.0);
        let topo = config.build_topology().unwrap();
        assert_eq!(topo.node(1).unwrap().role.as_deref(),Some("roadm"));
        assert_eq!(topo.risk_nodes(),vec![2]);
        assert!(topo.link(2).unwrap().is_directed());
        assert_eq!(topo.links_between(0, 2),&[] as &[usize]);
    }
    #[test]
    fn test_build_runs() {
        let mut simulator = SimulationConfig::from_json(RING).unwrap().build().unwrap();
        simulator.run().unwrap();
        assert_eq!(simulator.stats().total(),20);
    }
    #[test]
    fn test_rejections() {
        assert!(matches!(SimulationConfig::from_json("{"),Err(ConfigError::Json(_))));
        let dangling = RING.replace(r#""destination":2,"slots":16,"weight":80.0"#, r#""destination":9,"slots":16,"weight":80.0"#);
        let err = SimulationConfig::from_json(&dangling).unwrap().build().err();
        assert!(matches!(err,Some(ConfigError::Topology(TopologyError::DanglingNode{link:1,node:9}))));
        let negative = RING.replace(r#""rate":100.0"#, r#""rate":-1.0"#);
        assert!(matches!(SimulationConfig::from_json(&negative).unwrap().build(),Err(ConfigError::Traffic(_))));
        let unknown = RING.replace("disjoint-pair", "widest-path");
        assert!(matches!(SimulationConfig::from_json(&unknown),Err(ConfigError::Json(_))));
        let zero_k = RING.replace(r#"{"strategy":"disjoint-pair"}"#, r#"{"k":0}"#);
        assert!(matches!(SimulationConfig::from_json(&zero_k),Err(ConfigError::InvalidValue{field:"k",..})));
    }
    #[test]
    fn test_non_finite_qot_fields_name_themselves() {
        let mut config = SimulationConfig::from_json(RING).unwrap();
        config.qot.noise_figure_db = f64::NAN;
        assert!(matches!(config.validate(),Err(ConfigError::InvalidValue{section:"qot",field:"noise_figure_db",..})));
        config.qot.noise_figure_db = 5.5;
        config.qot.launch_power_dbm = f64::INFINITY;
        let Err(ConfigError::InvalidValue{field,value,..}) = config.validate() else {
            panic!("launch power should be rejected");
        };
        assert_eq!(field,"launch_power_dbm");
        assert_eq!(value,f64::INFINITY);
        config.qot.enabled = false;
        assert!(config.validate().is_ok());
    }
}
