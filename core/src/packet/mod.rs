pub mod assembler;
pub mod line;
pub mod reassembler;

pub use assembler::{PacketAssembler, PacketBuild};
pub use line::{classify, decode_line, Field, LineKind};
pub use reassembler::Reassembler;
