pub mod path_security;
pub mod staging;
