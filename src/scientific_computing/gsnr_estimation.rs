use lazy_static::lazy_static;
use std::f64::consts::PI;

//constants that will not be changed

//unit in m/s
const C_SPEED_OF_LIGHT:f64 = 299792458.0;

//unit in m^2·kg / s, which is also j*s, which is also w*s^2
const H_PLANK_CONSTANT:f64 = 6.62607015*1e-34;

type LenNM = f64;

//reference lambda, at 1550.0nm
const LAMBDA_0:LenNM = 1550.0;

//lower edge of slot 0 on every link
pub const GRID_START_THZ:FreqTHZ = 191.3;

pub type BandWidthTHZ = f64;
pub type DistanceKM = f64;
pub type FreqTHZ = f64;
pub type DB = f64;
pub type DBM = f64;

//power, unit in Watts, must be greater than 0,
pub type PowerWatt = f64;

// unit in W/THZ
pub type PowerDensity = f64;

pub fn db_to_linear(db:DB) -> f64 {
    10.0f64.powf(db/10.0)
}

pub fn linear_to_db(ratio:f64) -> DB {
    10.0*ratio.log10()
}

pub fn dbm_to_watt(dbm:DBM) -> PowerWatt {
    const MILIWATT:PowerWatt = 0.001;
    MILIWATT*db_to_linear(dbm)
}

// amplifiers sit every span_len, a partial span still needs one
pub fn span_count(length:DistanceKM,span_len:DistanceKM) -> usize {
    if length <= 0.0 || span_len <= 0.0 {
        return 1;
    }
    ((length/span_len).ceil() as usize).max(1)
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Channel {
    pub center:FreqTHZ,
    pub bandwidth:BandWidthTHZ,
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct FiberParameters {
    pub span_len:DistanceKM,
    //alpha:1/km, end/start = exp(-alpha*length)
    pub alpha:f64,
    //|beta2| in ps^2/km
    pub beta_2:f64,
    //unit in 1/W/KM
    pub gamma:f64,
    pub noise_figure_db:DB,
    //launch power of a single slot
    pub launch_power_dbm:DBM,
}

lazy_static! {
    pub static ref DEFAULT_FIBER:FiberParameters = FiberParameters::new(80.0, 0.2, 17.0, 1.3, 5.5, 0.0);
}

impl Default for FiberParameters {
    fn default() -> Self {
        *DEFAULT_FIBER
    }
}

impl FiberParameters {
    // attenuation in dB/km, dispersion in ps/nm/km at 1550nm
    pub fn new(span_len:DistanceKM,attenuation_db:f64,dispersion:f64,gamma:f64,noise_figure_db:DB,launch_power_dbm:DBM) -> Self {
        // because alpha is used in exp(alpha*z), it has to be converted
        let alpha = (attenuation_db/10.0)*(10.0f64.ln());
        let beta_2 = (1e3*dispersion*LAMBDA_0.powi(2)/(2.0*PI*C_SPEED_OF_LIGHT)).abs();
        Self {span_len,alpha,beta_2,gamma,noise_figure_db,launch_power_dbm}
    }
    pub fn span_gain(&self) -> f64 {
        (self.span_len*self.alpha).exp()
    }
    pub fn l_eff(&self) -> DistanceKM {
        (1.0 - (-self.alpha*self.span_len).exp())/self.alpha
    }
    // asymptotic effective length
    pub fn l_eff_a(&self) -> DistanceKM {
        1.0/self.alpha
    }
    // launch power spread flat over one slot
    pub fn launch_psd(&self,slot_width:BandWidthTHZ) -> PowerDensity {
        dbm_to_watt(self.launch_power_dbm)/slot_width
    }

    // ASE collected by one channel after one amplified span
    pub fn ase_power(&self,channel:&Channel) -> PowerWatt {
        let n_sp = db_to_linear(self.noise_figure_db);
        let ase = n_sp*H_PLANK_CONSTANT*(channel.bandwidth*1e12)*(channel.center*1e12)*self.span_gain();
        debug_assert!(ase > 0.0);
        ase
    }

    // closed form incoherent GN model, self channel plus every co-propagating one
    pub fn nli_power(&self,channel:&Channel,psd:PowerDensity,neighbours:&[Channel]) -> PowerWatt {
        let l_eff = self.l_eff();
        let l_eff_a = self.l_eff_a();
        let b_i = channel.bandwidth;

        let coeff = (8.0/27.0)*self.gamma.powi(2)*psd*l_eff.powi(2)/(PI*self.beta_2*l_eff_a);

        let spm = psd.powi(2)*((PI*PI/2.0)*self.beta_2*l_eff_a*b_i.powi(2)).asinh();

        let mut xpm = 0.0;
        for neighbour in neighbours {
            let delta_f = (channel.center - neighbour.center).abs();
            let near = delta_f - neighbour.bandwidth/2.0;
            let far = delta_f + neighbour.bandwidth/2.0;
            // spectra never overlap on a link
            debug_assert!(near > 0.0);
            if near <= 0.0 {continue}
            xpm += psd.powi(2)*(far/near).ln();
        }

        coeff*(spm + xpm)*b_i
    }

    pub fn span_noise(&self,channel:&Channel,psd:PowerDensity,neighbours:&[Channel]) -> PowerWatt {
        self.ase_power(channel) + self.nli_power(channel, psd, neighbours)
    }
}
