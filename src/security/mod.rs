pub mod jwt;

pub use jwt::AccessTokenIssuer;
