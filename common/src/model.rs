pub mod device;
pub mod inventory;
pub mod scan;
