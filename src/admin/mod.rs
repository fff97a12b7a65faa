//! Operator-only operations: rotating and inspecting the workshop token.
//!
//! ## Security Model
//!
//! - The admin secret is static, set at deployment, and distinct from the
//!   rotating workshop token
//! - An unset admin secret disables every privileged operation (fail closed)
//! - Mismatches are answered only after a fixed delay, longer than the
//!   participant-facing one
//! - Token values are never logged, and a rotation response never echoes
//!   the new token
//!
//! ## Usage
//!
//! ```ignore
//! let admin = AdminGate::new(config.admin_secret(), config.auth.admin_failure_delay());
//! let rotation = RotationProtocol::new(admin, store.clone(), TokenPolicy::from_config(&config.policy));
//!
//! rotation.rotate(&admin_secret, "demo1").await?;
//! let current = rotation.inspect(&admin_secret).await?;
//! ```

pub mod gate;
pub mod rotation;

pub use gate::AdminGate;
pub use rotation::{RotationError, RotationProtocol, TokenPolicy};
