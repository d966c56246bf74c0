//! Linear algebra result types and validation helpers

mod decompositions;
mod helpers;

pub use decompositions::{LuDecomposition, NormKind, SvdDecomposition};
pub use helpers::{
    default_rank_tolerance, validate_f32, validate_matrix_2d, validate_same_device,
    validate_square_matrix,
};
