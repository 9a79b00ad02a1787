//! Timer-driven UI services shared by every surface: transient
//! notifications and the loading indicator.

pub mod notification;
pub mod preloader;
