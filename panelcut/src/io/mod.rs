/// External (serializable) representations of instances and solutions.
pub mod ext_repr;

/// Conversion (and validation) of external instances into internal ones
pub mod import;

/// Conversion of layouts into their external representation
pub mod export;
