pub mod album;
pub mod artist;
pub mod genre;
pub mod record_label;
pub mod review;
pub mod track;
pub mod user;

pub use album::Entity as Album;
pub use artist::Entity as Artist;
pub use genre::Entity as Genre;
pub use record_label::Entity as RecordLabel;
pub use review::Entity as Review;
pub use track::Entity as Track;
pub use user::Entity as User;
