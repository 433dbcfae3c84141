pub mod credentials;

pub use credentials::{verify_password, PasswordCredentials};
