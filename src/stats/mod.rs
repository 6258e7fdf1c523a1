// Statistics: numeric coercion, efficiency formulas and aggregation.

pub mod aggregate;
pub mod numeric;
