// Remote data sources

pub mod eatws;
