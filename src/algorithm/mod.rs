//! Algorithm building blocks shared by the operation implementations

pub mod linalg;
