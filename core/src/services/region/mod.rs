//! Region context: selection, blacklist and the supported-region list

mod resolver;

pub use resolver::RegionResolver;
