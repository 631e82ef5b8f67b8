pub mod login;
pub mod model;
pub mod skin;
pub mod store;

pub use login::register_account;
pub use model::{Account, AccountsDocument};
pub use skin::{head_avatar, SkinSource, AVATAR_SIZE};
pub use store::AccountStore;
