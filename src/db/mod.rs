//! sqlx repositories. All reads are ACTIVE-filtered: a soft-deleted row
//! is indistinguishable from an absent one at this layer.

pub mod tasks;
pub mod users;
