//! Domain types: CMS structures, suites, keys and tokens.

pub mod cms;
pub mod constants;
pub mod crypto;
pub mod token;
pub mod verification;
