use std::fmt::Display;
use crate::scientific_computing::gsnr_estimation::{DistanceKM, DB};

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,PartialOrd,Ord)]
pub enum Modulation {
    Bpsk,
    Qpsk,
    Qam8,
    Qam16,
}

impl Modulation {
    // most spectrally efficient first
    pub const BY_EFFICIENCY:[Modulation;4] = [Modulation::Qam16,Modulation::Qam8,Modulation::Qpsk,Modulation::Bpsk];

    pub fn bits_per_symbol(&self) -> usize {
        match self {
            Modulation::Bpsk => 1,
            Modulation::Qpsk => 2,
            Modulation::Qam8 => 3,
            Modulation::Qam16 => 4,
        }
    }
    pub fn reach(&self) -> DistanceKM {
        match self {
            Modulation::Bpsk => 4000.0,
            Modulation::Qpsk => 2000.0,
            Modulation::Qam8 => 1000.0,
            Modulation::Qam16 => 500.0,
        }
    }
    pub fn min_snr_db(&self) -> DB {
        match self {
            Modulation::Bpsk => 6.8,
            Modulation::Qpsk => 9.8,
            Modulation::Qam8 => 13.2,
            Modulation::Qam16 => 16.2,
        }
    }
    // rate in Gb/s, slot capacity in Gbaud
    pub fn required_slots(&self,rate:f64,slot_capacity:f64) -> usize {
        (rate/(slot_capacity*self.bits_per_symbol() as f64)).ceil().max(1.0) as usize
    }
    // formats whose reach covers the length, best first
    pub fn candidates_for(length:DistanceKM) -> impl Iterator<Item = Modulation> {
        Self::BY_EFFICIENCY.into_iter().filter(move |modulation| modulation.reach() >= length)
    }
    pub fn best_for(length:DistanceKM) -> Option<Modulation> {
        Self::candidates_for(length).next()
    }
}

impl Display for Modulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Modulation::Bpsk => "BPSK",
            Modulation::Qpsk => "QPSK",
            Modulation::Qam8 => "8QAM",
            Modulation::Qam16 => "16QAM",
        };
        write!(f,"{name}")
    }
}
