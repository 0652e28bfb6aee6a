//! Business rules. Each service takes the acting user and a validated DTO,
//! checks permissions and lifecycle state against the database, and
//! performs the write. Services are synchronous; handlers run them through
//! [`crate::state::blocking`].

pub mod accounts;
pub mod campaigns;
pub mod proposals;
pub mod selection;

#[cfg(test)]
pub(crate) mod fixtures;
