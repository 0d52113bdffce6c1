pub mod config;
pub mod geometry;
pub mod histogram;
pub mod operator;
pub mod table;
pub mod top;

pub use config::{BorderHandling, EncodingType, LbpConfig};
pub use geometry::{block_offsets, compute_offsets, NeighborOffsets};
pub use histogram::LbpHistogramOperator;
pub use operator::LbpOperator;
pub use table::LookupTable;
pub use top::{LbpTopOperator, TopCodes};
