pub mod _404;
pub mod home;
