//! Remote classifier endpoints: descriptors, the transport seam, and the HTTP client.

pub mod client;
pub mod descriptor;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use client::{
    ClassifierClient, HttpClassifierClient, RawClassification, parse_classifications, strongest,
};
pub use descriptor::{ClassifierCatalog, ClassifierDescriptor, MediaKind};
pub use error::ClassifierError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockClassifierClient;
