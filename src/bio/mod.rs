pub mod abi;
pub mod fasta;
pub mod sequence;

pub use abi::{AbiDecoder, ChromatogramDecoder, DecodedTrace};
pub use sequence::{ReferenceSequence, SequenceRecord};
