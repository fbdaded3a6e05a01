pub mod infobox;

pub use infobox::RawInfobox;
