pub mod cholesky;
pub mod lu;
pub mod solver;
pub mod vector_ops;

#[cfg(feature = "pardiso")]
pub mod pardiso;
