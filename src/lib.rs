pub mod d3d;
pub mod export;
pub mod opf;
