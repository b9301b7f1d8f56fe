// Domain layer: records, evidence and results, plus the rectifier port.

pub mod model;
pub mod ports;
