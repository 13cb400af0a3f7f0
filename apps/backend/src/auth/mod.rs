pub mod claims;
pub mod credentials;
pub mod identity;
pub mod issuer;
pub mod jwt;
pub mod password;
pub mod policy;
