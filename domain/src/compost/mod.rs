//! Compost pile - the shared knowledge substrate
//!
//! Agents communicate exclusively through the pile: an append-mostly log of
//! keyed entries. Entries decay rather than disappear - marking an entry
//! *stale* keeps it readable in history views while hiding it from the
//! active working set.

pub mod entry;
pub mod pile;

pub use entry::CompostEntry;
pub use pile::CompostPile;
