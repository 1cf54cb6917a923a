// Domain layer: patient inputs, the encoded feature vector and the ports the
// pipeline depends on.

pub mod choices;
pub mod model;
pub mod ports;
