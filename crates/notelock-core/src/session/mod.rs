//! Lock session: who may act, and for how long.
//!
//! [`LockSessionManager`] gates edit, delete, save and unlock actions behind
//! a PIN or biometric check. A successful check opens a session window during
//! which further actions proceed without prompting; an auto-lock task closes
//! the window when it runs out.
//!
//! ```text
//!            require_auth            submit_pin / submit_biometric
//!   Locked ───────────────▶ AwaitingAuth ─────────────────────────▶ Unlocked
//!     ▲                                                                │
//!     └──────────── auto-lock timer, lock_now, logout ─────────────────┘
//! ```

mod biometric;
mod events;
mod manager;
mod request;
mod state;
mod timer;

pub use biometric::{BiometricCapability, NoBiometrics, StaticBiometric};
pub use events::{LockReason, SessionEvent};
pub use manager::LockSessionManager;
pub use request::{
    Approval, ApprovalMethod, AuthKind, AuthRequest, AuthStatus, OnApproved, Prompt, RequestId,
};
pub use state::LockState;
