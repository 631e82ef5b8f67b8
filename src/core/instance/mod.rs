pub mod manager;
pub mod model;

pub use manager::InstanceRegistry;
pub use model::{dir_name_for, Instance};
