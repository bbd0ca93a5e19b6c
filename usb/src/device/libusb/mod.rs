pub mod claim;
pub mod device;
