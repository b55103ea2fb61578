pub mod modification_store;

pub use modification_store::ModificationStore;
