// Entity construction and catalog assembly

pub mod assembler;
pub mod builder;
pub mod geodesy;
pub mod provenance;

pub use assembler::{assemble_catalog, AssembledCatalog};
pub use builder::{BuiltEvent, EntityBuilder};
