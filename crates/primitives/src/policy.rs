//! Ordered access policies
//!
//! A policy decides where a new entry lands. Every policy reads and removes
//! through the same selectors and enumerates in ascending order, so the
//! only difference between them is insertion placement:
//!
//! | Policy    | Insert placement                   | Next for removal | Enumeration        |
//! |-----------|------------------------------------|------------------|--------------------|
//! | `Lifo`    | order 0, everything else shifts up | order 0          | top → bottom       |
//! | `Fifo`    | appended at order = count          | lowest order     | front → back       |
//! | `Indexed` | appended, or explicit position     | explicit index   | 0 → count-1        |

use stowage_core::{Placement, Selector};

/// Placement rule layered on the index engine
pub trait Policy: Send + Sync + 'static {
    /// Short policy name used in logs
    const NAME: &'static str;

    /// Placement of an entry inserted without an explicit position
    fn insert_placement() -> Placement;

    /// Entry returned by pop/dequeue/peek
    fn next() -> Selector {
        Selector::Front
    }
}

/// Stack policy: last in, first out
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifo;

impl Policy for Lifo {
    const NAME: &'static str = "stack";

    fn insert_placement() -> Placement {
        Placement::Front
    }
}

/// Queue policy: first in, first out
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

impl Policy for Fifo {
    const NAME: &'static str = "queue";

    fn insert_placement() -> Placement {
        Placement::Append
    }
}

/// List policy: explicit positions, append by default
#[derive(Debug, Clone, Copy, Default)]
pub struct Indexed;

impl Policy for Indexed {
    const NAME: &'static str = "list";

    fn insert_placement() -> Placement {
        Placement::Append
    }
}
