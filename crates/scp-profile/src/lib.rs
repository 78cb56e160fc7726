//! SCP profile store
//!
//! Named groups of key/value properties persisted in INI-like files under
//! `<home>/.cmp/`, plus the advisory session marker living next to them.
//!
//! # Example
//!
//! ```no_run
//! use scp_profile::{CREDENTIALS, ProfileContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = ProfileContext::new()?;
//! context.start_session()?;
//!
//! let profiles = context.load_profiles();
//! if let Some(credentials) = profiles.get(CREDENTIALS) {
//!     println!("sections: {:?}", credentials.section_names());
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod legacy;
pub mod profile;
pub mod properties;

pub use codec::{MAX_LINE_LENGTH, decode, decode_str, encode, encode_to_string};
pub use context::{ENV_CONFIG_DIR, LockMarker, ProfileContext};
pub use error::{ProfileError, Result};
pub use legacy::{LegacyLayout, LegacyProfile};
pub use profile::{CONFIGURATIONS, CREDENTIALS, Profile, ProfileSet};
pub use properties::Properties;
