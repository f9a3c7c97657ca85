// seedable random sources for traffic generation
// every draw goes through a Sampler so a run is a pure function of its seed

use rand::distr::Distribution as _;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Exp;

pub trait Sampler {
    // uniform over 0..upper, upper must be positive
    fn uniform_index(&mut self,upper:usize) -> usize;
    fn exponential(&mut self,mean:f64) -> f64;
    // None when the weights are empty, negative or all zero
    fn weighted_index(&mut self,weights:&[f64]) -> Option<usize>;

    // uniform over ordered pairs of distinct values in 0..upper
    fn distinct_pair(&mut self,upper:usize) -> Option<(usize,usize)> {
        if upper < 2 {
            return None;
        }
        let first = self.uniform_index(upper);
        let mut second = self.uniform_index(upper - 1);
        if second >= first {
            second += 1;
        }
        Some((first,second))
    }
}

pub struct SeededSampler {
    seed:u64,
    rng:ChaCha8Rng,
}

impl SeededSampler {
    pub fn new(seed:u64) -> Self {
        Self {seed,rng:ChaCha8Rng::seed_from_u64(seed)}
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Sampler for SeededSampler {
    fn uniform_index(&mut self,upper:usize) -> usize {
        debug_assert!(upper > 0);
        if upper <= 1 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }
    fn exponential(&mut self,mean:f64) -> f64 {
        match Exp::new(1.0/mean) {
            Ok(exp) => exp.sample(&mut self.rng),
            Err(_) => 0.0
        }
    }
    fn weighted_index(&mut self,weights:&[f64]) -> Option<usize> {
        let index = WeightedIndex::new(weights).ok()?;
        Some(index.sample(&mut self.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::{Sampler, SeededSampler};

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = SeededSampler::new(7);
        let mut b = SeededSampler::new(7);
        for _ in 0..100 {
            assert_eq!(a.uniform_index(13),b.uniform_index(13));
            assert_eq!(a.exponential(2.5).to_bits(),b.exponential(2.5).to_bits());
        }
        assert_eq!(a.seed(),7);
    }
    #[test]
    fn test_exponential_mean() {
        let mut sampler = SeededSampler::new(1);
        let n = 20000;
        let mean = (0..n).map(|_| sampler.exponential(4.0)).sum::<f64>()/n as f64;
        assert!((mean - 4.0).abs() < 0.2, "sample mean {mean}");
    }
    #[test]
    fn test_distinct_pair() {
        let mut sampler = SeededSampler::new(3);
        assert!(sampler.distinct_pair(1).is_none());
        let mut hits = [0usize;3];
        for _ in 0..3000 {
            let (a,b) = sampler.distinct_pair(3).unwrap();
            assert_ne!(a,b);
            hits[b] += 1;
        }
        assert!(hits.iter().all(|count| *count > 800));
    }
    #[test]
    fn test_weighted_index() {
        let mut sampler = SeededSampler::new(11);
        assert!(sampler.weighted_index(&[]).is_none());
        assert!(sampler.weighted_index(&[0.0,0.0]).is_none());
        for _ in 0..100 {
            assert_eq!(sampler.weighted_index(&[0.0,1.0,0.0]),Some(1));
        }
    }
}
