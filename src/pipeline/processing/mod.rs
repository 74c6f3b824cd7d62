// Processing stages: parse, normalize, derive, build and assemble

pub mod catalog;
pub mod derive;
pub mod normalize;
pub mod parser;
