//! # paperflow-builder
//!
//! **Assembly plane**: everything that happens to a transaction before it is
//! signed, plus the interfaces to the collaborators it is built against.
//!
//! ## Architecture
//!
//! 1. **TransactionBuilder**: accumulates inputs, outputs, attachments, time-window, signers
//! 2. **CommercialPaper**: fills a builder for an issue or a move
//! 3. **StateResolver / AttachmentStore / SigningService**: collaborator interfaces
//! 4. **KeyStore**: ed25519 signing service
//! 5. **InMemoryAttachmentStore**: content-addressed document store
//!
//! ## Build Flow
//!
//! ```text
//! TransactionBuilder::new(notary) → CommercialPaper::generate_issue()/generate_move()
//!     → add_attachment() → set_time_window() → build() → SigningService::sign()
//! ```

pub mod attachments;
pub mod builder;
pub mod keystore;
pub mod paper;
pub mod traits;

pub use attachments::InMemoryAttachmentStore;
pub use builder::TransactionBuilder;
pub use keystore::KeyStore;
pub use paper::CommercialPaper;
pub use traits::{Attachment, AttachmentStore, SigningService, StateResolver};
