// discrete event simulation of routing, modulation and spectrum assignment
// in elastic optical networks

pub mod config;

pub mod dsa {
    pub mod bitset;
    pub mod event_queue;
    pub mod graph;
}

pub mod optical_network;

pub mod scientific_computing {
    pub mod distribution;
    pub mod gsnr_estimation;
    pub mod statistics;
}

pub use config::{ConfigError, SimulationConfig};
pub use optical_network::simulator::{SimulationError, Simulator};
