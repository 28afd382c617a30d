mod particle_system;

pub use particle_system::*;
