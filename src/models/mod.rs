pub mod device;
pub mod organization;
pub mod reading;
pub mod user;

pub use device::*;
pub use organization::*;
pub use reading::*;
pub use user::*;
