pub mod gate;
pub mod identity;
pub mod navigator;
pub mod principal;
pub mod route;
pub mod session;
