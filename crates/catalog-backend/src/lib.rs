pub mod error;
pub mod firestore;
pub mod identity;
pub mod traits;
pub mod wire;

pub use error::BackendError;
pub use firestore::FirestoreClient;
pub use identity::IdentityClient;
pub use traits::{AuthProvider, Document, DocumentStore, Session};
