pub mod bonds;
pub mod pricing;
pub mod yields;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;
