//! kms_epid_gen - KMS host Extended Product ID generator
//!
//! KMS hosts report an ePID in every activation response, and clients
//! check it for plausibility. This crate builds ePIDs that combine a host
//! OS profile, a product key range, the volume license channel and a
//! randomized activation date into the fixed-width text form:
//!
//! ```text
//! 06401-00206-271-000345-03-1033-9600.0000-0452021
//! ```
//!
//! # Example
//!
//! ```
//! use kms_epid_gen::{ApplicationId, EpidGenerator};
//!
//! let generator = EpidGenerator::system().unwrap();
//! let epid = generator
//!     .generate(&mut rand::thread_rng(), ApplicationId::Office15, 6)
//!     .unwrap();
//! assert_eq!(epid.group_id, 206);
//! assert_eq!(epid.to_string().len(), 48);
//! ```

pub mod clock;
pub mod epid;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use epid::{select_key_config, Epid, EpidGenerator};
pub use error::EpidError;
pub use types::{ApplicationId, HostOs, HostOsProfile, KeyConfig, HOST_OS_PROFILES, KEY_CONFIGS};
