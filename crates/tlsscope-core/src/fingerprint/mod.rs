pub mod clienthello;
pub mod grease;
pub mod ja3;
pub mod ja3s;
pub mod serverhello;
pub mod types;
