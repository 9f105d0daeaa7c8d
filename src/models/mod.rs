pub mod history;
pub mod mfa;
pub mod signature;
