//! # Route Modules
//!
//! | Prefix                 | Module          | Auth |
//! |------------------------|-----------------|------|
//! | `/v1/credentials/*`    | [`credentials`] | yes  |
//! | `/v1/profiles/*`       | [`profiles`]    | yes  |
//! | `/v1/verify/*`         | [`verify`]      | no   |

pub mod credentials;
pub mod profiles;
pub mod verify;
