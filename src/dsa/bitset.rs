use std::ops::Range;

// packed bits, bit i lives in bytes[i/8] at position i%8
// bits past `size` in the last byte are always kept at 0
#[derive(Clone,Debug,PartialEq,Eq,Hash)]
pub struct BitSet {
    size:usize,
    bytes:Vec<u8>
}

impl Default for BitSet {
    fn default() -> Self {
        Self::new()
    }
}

impl BitSet {
    pub fn new() -> Self {
        Self {size:0,bytes:vec![]}
    }
    pub fn with_capacity(capacity:usize) -> Self {
        if capacity == 0 {return Self::new()}
        let vec_capacity = capacity/8 + 1;
        Self {
            size:0,
            bytes:Vec::with_capacity(vec_capacity)
        }
    }
    // a set of `len` bits, all equal to `bit`
    pub fn with_len(len:usize,bit:bool) -> Self {
        let mut set = Self::with_capacity(len);
        for _ in 0..len {set.push_bit(bit);}
        set
    }
    pub fn len(&self) -> usize {
        self.size
    }
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
    pub fn push_bit(&mut self, bit:bool) {
        let byte_pos = self.size / 8;
        let pos_in_byte = self.size % 8;

        debug_assert!(byte_pos <= self.bytes.len());

        if let Some(byte) = self.bytes.get_mut(byte_pos) {
            let mask = 1u8 << pos_in_byte;
            if bit {
                *byte |= mask;
            }else{
                *byte &= !mask;
            }
        }else{
            // a fresh byte always starts at position 0
            self.bytes.push(if bit {1} else {0})
        }
        self.size += 1;
    }
    pub fn get_at(&self,index:usize) -> Option<bool> {
        if index >= self.size {return None}
        let byte_pos = index / 8;
        let pos_in_byte = index % 8;
        let byte = self.bytes.get(byte_pos)?;
        let mask = 1u8 << pos_in_byte;
        Some(*byte & mask > 0)
    }
    pub fn store_at(&mut self,index:usize,bit:bool) -> Option<()> {
        if index >= self.size {return None}
        let byte_pos = index / 8;
        let pos_in_byte = index % 8;
        let byte = self.bytes.get_mut(byte_pos)?;
        let mask = 1u8 << pos_in_byte;
        if bit {
            *byte |= mask;
        }else{
            *byte &= !mask;
        }
        Some(())
    }
    // None if the range leaves the set
    pub fn store_range(&mut self,range:Range<usize>,bit:bool) -> Option<()> {
        if range.end > self.size || range.start > range.end {return None}
        for index in range {
            self.store_at(index, bit)?;
        }
        Some(())
    }
    // Some(true) when every bit of the range equals `bit`
    pub fn range_all(&self,range:Range<usize>,bit:bool) -> Option<bool> {
        if range.end > self.size || range.start > range.end {return None}
        for index in range {
            if self.get_at(index)? != bit {
                return Some(false);
            }
        }
        Some(true)
    }
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|byte| byte.count_ones() as usize).sum()
    }
    pub fn count_zeros(&self) -> usize {
        self.size - self.count_ones()
    }
    // bitwise or, both sets must have the same length
    pub fn union_with(&mut self,other:&BitSet) -> Option<()> {
        if self.size != other.size {return None}
        for (left,right) in self.bytes.iter_mut().zip(other.bytes.iter()) {
            *left |= *right;
        }
        Some(())
    }
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.size).filter_map(|index| self.get_at(index))
    }
    // maximal runs of `bit`, as (start,len), in ascending order
    pub fn runs(&self,bit:bool) -> Vec<(usize,usize)> {
        let mut runs = vec![];
        let mut start:Option<usize> = None;
        for (index,value) in self.iter().enumerate() {
            match (value == bit,start) {
                (true,None) => start = Some(index),
                (false,Some(s)) => {
                    runs.push((s,index - s));
                    start = None;
                },
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s,self.size - s));
        }
        runs
    }
}
