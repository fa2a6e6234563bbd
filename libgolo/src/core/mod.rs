pub mod bitstream;
pub mod golomb;
pub mod samples;

pub use bitstream::{BitReader, BitWriter};
pub use golomb::{deinterleave, interleave, optimal_m, Golomb, SignMode};
pub use samples::{f64_to_i16, i16_to_f64};
