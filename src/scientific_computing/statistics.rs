use std::fmt::Display;
use crate::optical_network::routing::BlockReason;

// end of run counters, blocking probability = blocked/total
#[derive(Clone,Debug,Default,PartialEq)]
pub struct BlockingStats {
    total:u64,
    accepted:u64,
    blocked:u64,
    by_reason:[u64;4],
    degraded:u64,
}

impl BlockingStats {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn record_accept(&mut self) {
        self.total += 1;
        self.accepted += 1;
    }
    pub fn record_block(&mut self,reason:BlockReason) {
        self.total += 1;
        self.blocked += 1;
        self.by_reason[reason.index()] += 1;
    }
    pub fn record_degraded(&mut self) {
        self.degraded += 1;
    }
    pub fn total(&self) -> u64 {
        self.total
    }
    pub fn accepted(&self) -> u64 {
        self.accepted
    }
    pub fn blocked(&self) -> u64 {
        self.blocked
    }
    pub fn blocked_by(&self,reason:BlockReason) -> u64 {
        self.by_reason[reason.index()]
    }
    pub fn degraded(&self) -> u64 {
        self.degraded
    }
    pub fn blocking_probability(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.blocked as f64/self.total as f64
    }
}

impl Display for BlockingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"{} demands, {} accepted, {} blocked ({:.4})",self.total,self.accepted,self.blocked,self.blocking_probability())?;
        for reason in BlockReason::ALL {
            let count = self.blocked_by(reason);
            if count > 0 {
                write!(f,", {reason}: {count}")?;
            }
        }
        if self.degraded > 0 {
            write!(f,", {} degraded",self.degraded)?;
        }
        Ok(())
    }
}
