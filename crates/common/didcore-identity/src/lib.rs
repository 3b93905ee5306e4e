//! DID document management, selective-disclosure credential issuance and
//! presentation verification.
//!
//! Signing payloads are produced here and signed by the caller (or with
//! [`sign_payload`]); the signed payloads are then folded back in with the
//! managers' `add_proof` operations.

mod did_manager;
mod vc_manager;
mod verify;
mod vp_manager;


pub use did_manager::{DidManager, StagedDocument};
pub use vc_manager::VcManager;
pub use verify::{sign_payload, verify_signature};
pub use vp_manager::{PresentationState, VpManager};
