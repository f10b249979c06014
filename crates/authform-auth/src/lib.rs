//! # authform-auth
//!
//! The two credential forms and the identity service they submit to.
//!
//! - [`forms`] - sign-in and sign-up schemas and form constructors
//! - [`identity`] - the simulated identity service

pub mod forms;
pub mod identity;

pub use forms::{sign_in_schema, sign_up_schema, FormKind};
pub use identity::SimulatedIdentityService;
