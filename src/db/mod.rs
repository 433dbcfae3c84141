pub mod entities;
pub mod repositories;
pub mod seed;

pub use entities::*;
pub use repositories::{Repository, UnitOfWork};
