pub mod d4;
pub mod mirror;
pub mod pentago;
pub mod symmetrizer;
