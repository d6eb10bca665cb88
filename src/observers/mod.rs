// Consumers of simulation output

pub mod imgstream;
