//! Invoice number sequencing.
//!
//! Numbers look like `INV-20250001`. The counter-backed strategy lives with
//! the database layer; this module owns the format, the strategy trait, the
//! clock-based fallback and the single-retry collision policy.

pub mod allocator;
pub mod number;

pub use allocator::{
    Allocation, AllocationMode, AttemptError, InvoiceNumberAllocator, SequenceError,
    TimestampFallbackAllocator, with_single_bump,
};
pub use number::{INVOICE_PREFIX, InvoiceNumber};
