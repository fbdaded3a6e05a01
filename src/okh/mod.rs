pub mod image;
pub mod mapping;
pub mod record;
pub mod users;

pub use mapping::{to_okh, ImageStatus, Mapped};
pub use record::OkhRecord;
