//! Domain Value Objects

pub mod email;
pub mod user_name;
pub mod user_password;

pub use email::Email;
pub use user_name::UserName;
pub use user_password::{RawPassword, UserPassword};

// IDs come from the shared kernel; the mobile rule is owned by the
// verification domain and reused here unchanged.
pub use kernel::id::{AddressId, UserId};
pub use verify::models::Mobile;
