//! Send-and-confirm transfers
//!
//! [`TransferCoordinator`] submits a transfer through the wallet API and then
//! confirms it in the background by watching the sender's balance. The native
//! currency and the secondary token run on independent lanes.

pub mod coordinator;
pub mod events;
pub mod lane;
mod poller;
pub mod purchase;
pub mod request;
pub mod state;
pub mod wallet;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use coordinator::{Session, TransferCoordinator};
pub use events::{ConfirmationSource, TransferEvent};
pub use lane::LaneSpec;
pub use purchase::{NftListing, NftPrice, PurchaseError, NATIVE_CURRENCY};
pub use request::TransferRequest;
pub use state::TransferState;
pub use wallet::WalletData;
