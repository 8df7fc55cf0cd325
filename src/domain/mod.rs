// Domain layer: rotation models and the ports the core depends on.
// No knowledge of the concrete cloud API or process environment lives here.

pub mod model;
pub mod ports;
