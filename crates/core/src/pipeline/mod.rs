//! Transfer pipeline: one created file, one upload.

mod error;
mod transfer;

pub use error::TransferError;
pub use transfer::{TransferPipeline, UploadReceipt};
